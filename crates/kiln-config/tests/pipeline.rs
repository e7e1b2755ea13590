//! Configuration and pipeline properties over the full standard manifest.

use kiln_config::{
    ArtifactKind, BuildMode, ConfigError, ConfigFactory, Configuration, Declaration,
    ExecutionTarget, Layout, Manifest, Plugin, PluginComposer, PluginKind,
};
use std::path::PathBuf;

const MODES: [BuildMode; 2] = [BuildMode::Development, BuildMode::Production];

fn resolve(mode: BuildMode, manifest: &Manifest) -> Vec<(String, ArtifactKind, Configuration)> {
    let factory = ConfigFactory::new(mode, Layout::default());
    let composer = PluginComposer::new(mode, Layout::default());
    manifest
        .iter()
        .map(|spec| {
            let base = factory.base_config(spec.target, &spec.name);
            let config = composer.compose(&base, spec).unwrap();
            (spec.name.clone(), spec.kind, config)
        })
        .collect()
}

#[test]
fn every_pipeline_starts_with_env() {
    let manifest = Manifest::standard().unwrap();
    for mode in MODES {
        for (name, _, config) in resolve(mode, &manifest) {
            assert_eq!(config.position_of(PluginKind::Env), Some(0), "{name}");
            assert_eq!(config.count_plugins(PluginKind::Env), 1, "{name}");
        }
    }
}

#[test]
fn optimization_only_in_production() {
    let manifest = Manifest::standard().unwrap();
    for (name, _, config) in resolve(BuildMode::Development, &manifest) {
        assert_eq!(config.count_plugins(PluginKind::Optimize), 0, "{name}");
    }
    for (name, _, config) in resolve(BuildMode::Production, &manifest) {
        assert_eq!(config.position_of(PluginKind::Optimize), Some(1), "{name}");
        assert_eq!(config.optimization().unwrap().bake_api_into_bundle, name);
    }
}

#[test]
fn page_plugins_only_for_pages() {
    let manifest = Manifest::standard().unwrap();
    for mode in MODES {
        for (name, kind, config) in resolve(mode, &manifest) {
            assert_eq!(config.html_entry().is_some(), kind.is_page(), "{name}");
            assert_eq!(config.copy_assets().is_some(), kind.is_page(), "{name}");
            assert_eq!(
                config.count_plugins(PluginKind::StyledComponents),
                usize::from(kind.is_page()),
                "{name}"
            );
        }
    }
}

#[test]
fn resolution_is_idempotent() {
    let manifest = Manifest::standard().unwrap();
    for mode in MODES {
        assert_eq!(resolve(mode, &manifest), resolve(mode, &manifest));
    }
}

#[test]
fn production_search_page() {
    let manifest = Manifest::standard().unwrap();
    let (_, _, config) = resolve(BuildMode::Production, &manifest)
        .into_iter()
        .find(|(name, _, _)| name == "search")
        .unwrap();

    assert_eq!(config.target, ExecutionTarget::Browser);
    assert_eq!(config.output_path, PathBuf::from("build/search.js"));
    assert!(config.single_bundle_mode);
    assert!(config.module_resolution_scope.is_some());
    assert!(!config.source_maps_enabled);
    assert!(!config.caching_enabled);

    let html = config.html_entry().unwrap();
    assert_eq!(html.template, PathBuf::from("static/pages/search.html"));
    assert_eq!(html.public_path, ".");
    assert_eq!(html.filename, "search.html");
    assert_eq!(config.copy_assets().unwrap().resolve, "./assets");
}

#[test]
fn duplicate_names_fail_closed() {
    let decls = [
        Declaration {
            name: "main",
            target: "server",
            kind: ArtifactKind::Server,
            entry: "main/index.ts",
            isolated: true,
        },
        Declaration {
            name: "main",
            target: "server",
            kind: ArtifactKind::Server,
            entry: "main/other.ts",
            isolated: true,
        },
    ];
    let err = Manifest::declare(&decls).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateArtifact(name) if name == "main"));
}

#[test]
fn unknown_target_rejected_at_declaration() {
    let decls = [Declaration {
        name: "worker",
        target: "deno",
        kind: ArtifactKind::Server,
        entry: "worker/index.ts",
        isolated: true,
    }];
    let err = Manifest::declare(&decls).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTarget(raw) if raw == "deno"));
}

#[test]
fn misordered_pipeline_is_rejected() {
    let manifest = Manifest::standard().unwrap();
    let (_, _, mut config) = resolve(BuildMode::Production, &manifest).remove(0);
    config.plugin_pipeline.swap(0, 1);
    assert!(matches!(
        config.validate_pipeline("newtab"),
        Err(ConfigError::InvalidPipeline { .. })
    ));

    config.plugin_pipeline.swap(0, 1);
    config.plugin_pipeline.push(Plugin::Json);
    assert!(config.validate_pipeline("newtab").is_ok());
}

#[test]
fn configuration_serializes_camel_case() {
    let manifest = Manifest::standard().unwrap();
    let (_, _, config) = resolve(BuildMode::Development, &manifest).remove(6);
    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(value["target"], "server");
    assert_eq!(value["outputPath"], "build/main.js");
    assert!(value.get("moduleResolutionScope").is_none());
    assert_eq!(value["pluginPipeline"][0]["kind"], "env");
    assert_eq!(value["pluginPipeline"][0]["vars"]["NODE_ENV"], "development");
    assert_eq!(value["pathAliases"]["~"], "src");

    let back: Configuration = serde_json::from_value(value).unwrap();
    assert_eq!(back, config);
}
