//! CLI command handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use polkadot_api::{Polkadot, StatefulSet};
use polkadot_reconciler::{
    DefaultWorkloadBuilder, InMemoryClient, InMemoryResourceProvider, Reconciler,
    ReconcilerConfig, ReconciliationLoop, RoleStrategy, TracingClient, WorkloadBuilder,
    WorkloadClient,
};
use tokio::signal;
use tracing::{error, info, warn};

use crate::cli::{Commands, Input};

/// Execute a CLI command.
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Render { manifest, config } => cmd_render(&manifest, config.as_deref()),
        Commands::Reconcile { input, max_passes } => cmd_reconcile(input, max_passes).await,
        Commands::Run { input } => cmd_run(input).await,
    }
}

/// Print the desired workloads of one manifest.
fn cmd_render(manifest: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let resource = load_manifest(manifest, &config)?;
    let builder = DefaultWorkloadBuilder::from_config(&config);

    let strategy = RoleStrategy::select(&resource.spec.kind);
    let workloads: Vec<StatefulSet> = strategy
        .workload_roles()
        .iter()
        .map(|role| builder.build(*role, &resource))
        .collect();

    if workloads.is_empty() {
        warn!(kind = %resource.spec.kind, "Role manages no workload");
    }

    println!("{}", render_yaml(&workloads)?);
    Ok(())
}

/// Reconcile against an in-memory cluster until every resource settles.
async fn cmd_reconcile(input: Input, max_passes: u32) -> Result<()> {
    let (runner, cluster) = build_loop(&input)?;

    for pass in 1..=max_passes {
        let report = runner.run_once().await.context("Reconciliation pass failed")?;
        info!(
            pass,
            reconciled = report.reconciled.len(),
            forced_requeues = report.forced_requeues,
            "Pass finished"
        );

        if report.is_settled() {
            let objects = cluster.objects().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&objects).context("Failed to encode StatefulSets")?
            );
            return Ok(());
        }

        for (key, reason) in &report.failed {
            error!(key = %key, reason = %reason, "Resource failed to reconcile");
        }
    }

    bail!("resources did not settle within {max_passes} passes")
}

/// Run the loop on its resync interval until Ctrl+C.
async fn cmd_run(input: Input) -> Result<()> {
    let (runner, _cluster) = build_loop(&input)?;
    let runner = Arc::new(runner);
    let stopper = runner.stopper();

    let handle = tokio::spawn({
        let runner = Arc::clone(&runner);
        async move { runner.run().await }
    });

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, stopping reconciliation loop"),
        Err(err) => error!("Failed to listen for shutdown signal: {}", err),
    }

    stopper.stop();
    handle.await.context("Reconciliation loop task failed")?;
    Ok(())
}

fn build_loop(input: &Input) -> Result<(ReconciliationLoop, Arc<InMemoryClient>)> {
    let config = load_config(input.config.as_deref())?;
    let resources = input
        .manifests
        .iter()
        .map(|path| load_manifest(path, &config))
        .collect::<Result<Vec<_>>>()?;

    let cluster = InMemoryClient::new_arc();
    let client: Arc<dyn WorkloadClient> = Arc::new(TracingClient::new(Arc::clone(&cluster)));
    let reconciler = Arc::new(Reconciler::with_default_builder(client, config));
    let provider = Arc::new(InMemoryResourceProvider::new(resources));

    Ok((ReconciliationLoop::new(reconciler, provider), cluster))
}

fn load_config(path: Option<&Path>) -> Result<ReconcilerConfig> {
    path.map_or_else(
        || Ok(ReconcilerConfig::default()),
        |p| ReconcilerConfig::load(p).context("Failed to load operator configuration"),
    )
}

/// Read a manifest, JSON when the extension says so, YAML otherwise.
///
/// Manifests on disk were never stored by a cluster, so a stable local uid
/// stands in for the one the API server would assign.
fn load_manifest(path: &Path, config: &ReconcilerConfig) -> Result<Polkadot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest '{}'", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        Polkadot::from_json_str(&contents)
    } else {
        Polkadot::from_yaml_str(&contents)
    };
    let mut resource = config.with_default_namespace(
        parsed.with_context(|| format!("Invalid manifest '{}'", path.display()))?,
    );

    if resource.metadata.uid.is_none() {
        resource.metadata.uid = Some(format!("local-{}-{}", resource.namespace(), resource.name()));
    }
    Ok(resource)
}

fn render_yaml(workloads: &[StatefulSet]) -> Result<String> {
    workloads
        .iter()
        .map(|w| serde_yaml::to_string(w).context("Failed to encode StatefulSet"))
        .collect::<Result<Vec<_>>>()
        .map(|docs| docs.join("---\n"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use std::io::Write;

    use super::*;

    fn manifest_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_load_yaml_manifest_applies_defaults() {
        let file = manifest_file(".yaml", "metadata:\n  name: alice\nspec:\n  kind: Sentry\n");
        let resource = load_manifest(file.path(), &ReconcilerConfig::default()).unwrap();

        assert_eq!(resource.namespace(), "default");
        assert_eq!(resource.metadata.uid.as_deref(), Some("local-default-alice"));
    }

    #[test]
    fn test_load_json_manifest() {
        let file = manifest_file(
            ".json",
            r#"{"metadata":{"name":"bob","namespace":"kusama","uid":"abc"},"spec":{"kind":"Validator"}}"#,
        );
        let resource = load_manifest(file.path(), &ReconcilerConfig::default()).unwrap();

        assert_eq!(resource.namespace(), "kusama");
        assert_eq!(resource.metadata.uid.as_deref(), Some("abc"));
    }

    #[test]
    fn test_render_yaml_separates_documents() {
        let builder = DefaultWorkloadBuilder::default();
        let resource = Polkadot::new("kusama", "alice", "SentryAndValidator");
        let rendered =
            render_yaml(&[builder.sentry(&resource), builder.validator(&resource)]).unwrap();

        assert_eq!(rendered.matches("---").count(), 1);
        assert!(rendered.contains("alice-sentry"));
        assert!(rendered.contains("alice-validator"));
    }

    #[tokio::test]
    async fn test_reconcile_command_settles() {
        let file = manifest_file(
            ".yaml",
            "metadata:\n  name: alice\n  namespace: kusama\nspec:\n  kind: SentryAndValidator\n",
        );
        let input = Input {
            manifests: vec![file.path().to_path_buf()],
            config: None,
        };

        let (runner, cluster) = build_loop(&input).unwrap();
        let report = runner.run_once().await.unwrap();

        assert!(report.is_settled());
        assert_eq!(cluster.objects().await.len(), 2);
    }
}
