/// Reject blank engine commands.
pub fn parse_engine_command(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Engine command cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}
