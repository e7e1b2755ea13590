#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command, ModeArg, parse_engine_command};
    use clap::Parser;
    use kiln_config::BuildMode;
    use std::path::PathBuf;

    #[test]
    fn test_parse_build_with_overrides() {
        let cli = Cli::parse_from(["kiln", "build", "--port", "5000", "--engine", "node x.js"]);
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.port, Some(5000));
                assert_eq!(args.engine.as_deref(), Some("node x.js"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["kiln", "check", "--cwd", "/tmp/app", "-v", "--no-color"]);
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp/app")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["kiln", "-v", "-q", "check"]).is_err());
    }

    #[test]
    fn test_plan_mode() {
        let cli = Cli::parse_from(["kiln", "plan", "--mode", "development"]);
        match cli.command {
            Command::Plan(args) => {
                assert_eq!(args.mode, Some(ModeArg::Development));
                assert_eq!(BuildMode::from(ModeArg::Development), BuildMode::Development);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_engine_command() {
        assert_eq!(parse_engine_command("  node bundle.js "), Ok("node bundle.js".to_string()));
        assert!(parse_engine_command("   ").is_err());
        assert!(Cli::try_parse_from(["kiln", "build", "--engine", ""]).is_err());
    }
}
