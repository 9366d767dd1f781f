//! Orchestrator actor: applies routed changes to the output tree.
//!
//! Owns the incremental rebuild pipeline (compile or copy one file, push a
//! reload), the debounced zip pass and the orphan sweep. Single-threaded
//! by construction: every mutation of the output tree and the fingerprint
//! store goes through this actor, so no locking is needed.

mod reconcile;
mod zip;

pub use reconcile::{OrphanReconciler, reconcile_output};
pub use zip::ZipScheduler;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use super::messages::{OrchestratorMsg, ReloadMsg};
use super::watch::ChangeKind;
use crate::archive::{ArchiveCache, archive_path_for, archive_unit, write_manifest};
use crate::build;
use crate::config::ProjectConfig;
use crate::core::SourceCategory;
use crate::logger::{status_error, status_success};
use crate::utils::path::relative_slash;

pub struct Orchestrator {
    rx: mpsc::Receiver<OrchestratorMsg>,
    reload_tx: mpsc::Sender<ReloadMsg>,
    config: Arc<ProjectConfig>,
    cache: ArchiveCache,
    zip: ZipScheduler,
    reconciler: OrphanReconciler,
}

impl Orchestrator {
    pub fn new(
        rx: mpsc::Receiver<OrchestratorMsg>,
        reload_tx: mpsc::Sender<ReloadMsg>,
        config: Arc<ProjectConfig>,
    ) -> Self {
        let cache = ArchiveCache::new(config.cache_dir());
        let zip = ZipScheduler::new(Duration::from_millis(config.watch.zip_debounce_ms));
        let reconciler =
            OrphanReconciler::new(Duration::from_millis(config.watch.reconcile_debounce_ms));
        Self {
            rx,
            reload_tx,
            config,
            cache,
            zip,
            reconciler,
        }
    }

    /// Run the actor event loop until Shutdown or channel close.
    pub async fn run(mut self) {
        loop {
            let sleep = self
                .zip
                .sleep_duration(Instant::now())
                .min(self.reconciler.sleep_duration(Instant::now()));
            tokio::select! {
                biased;
                msg = self.rx.recv() => {
                    match msg {
                        Some(OrchestratorMsg::Shutdown) | None => break,
                        Some(msg) => self.handle(msg).await,
                    }
                }
                _ = tokio::time::sleep(sleep) => self.tick().await,
            }
        }
        crate::debug!("watch"; "orchestrator stopped");
    }

    /// Fire whichever debounced passes came due.
    async fn tick(&mut self) {
        let now = Instant::now();
        if let Some(reason) = self.zip.take_if_ready(now) {
            self.run_zip_pass(&reason).await;
        }
        if self.reconciler.take_if_ready(now) {
            self.run_reconcile_pass().await;
        }
    }

    async fn handle(&mut self, msg: OrchestratorMsg) {
        let now = Instant::now();
        match msg {
            OrchestratorMsg::SourceFile {
                path,
                category,
                kind,
            } => {
                let label = relative_slash(&path, self.config.get_root())
                    .unwrap_or_else(|| path.display().to_string());
                match kind {
                    ChangeKind::Created | ChangeKind::Modified => {
                        if self.apply_source_change(&path, category) {
                            status_success(&label);
                            self.reload(&label).await;
                            self.zip.schedule(&label, self.config.watch.auto_zip, now);
                        }
                    }
                    ChangeKind::Removed => {
                        self.remove_source_output(&path);
                        status_success(&format!("removed {label}"));
                        self.reload(&label).await;
                        // Deletions must reach the archives even with
                        // auto-zip off
                        self.zip.schedule_forced(&label, now);
                    }
                }
            }

            OrchestratorMsg::GlobalChanged { category } => {
                match build::rebuild_category(&self.config, category) {
                    Ok(count) => {
                        let label = format!("global {}s ({count} files)", category.label());
                        status_success(&label);
                        self.reload(&label).await;
                        self.zip.schedule(&label, self.config.watch.auto_zip, now);
                    }
                    Err(e) => status_error(&format!("global {} rebuild", category.label()), &format!("{e:#}")),
                }
            }

            OrchestratorMsg::UnitAdded { name } => match build::build_unit(&self.config, &name) {
                Ok(stats) => {
                    status_success(&format!(
                        "new unit {name} ({} compiled, {} copied)",
                        stats.compiled, stats.copied
                    ));
                    for (path, error) in &stats.errors {
                        status_error(&path.display().to_string(), error);
                    }
                    self.refresh_listing();
                    self.reload(&name).await;
                    self.zip.schedule(&name, self.config.watch.auto_zip, now);
                }
                Err(e) => status_error(&format!("build {name}"), &format!("{e:#}")),
            },

            OrchestratorMsg::UnitRemoved { name } => {
                build::remove_unit_output(&self.config, &name);
                status_success(&format!("removed unit {name}"));
                self.refresh_listing();
                self.reload(&name).await;
                self.zip.schedule_forced(&name, now);
                self.reconciler.schedule(now);
            }

            OrchestratorMsg::ScheduleReconcile => self.reconciler.schedule(now),

            OrchestratorMsg::Shutdown => unreachable!("handled in run loop"),
        }
    }

    /// Compile or copy one changed source file. Returns false on failure
    /// (already reported via the status line).
    fn apply_source_change(&self, path: &std::path::Path, category: SourceCategory) -> bool {
        if category.is_compiled() {
            match build::compile_file(&self.config, category, path) {
                Ok(_) => true,
                Err(e) => {
                    status_error(
                        &relative_slash(path, self.config.get_root())
                            .unwrap_or_else(|| path.display().to_string()),
                        &format!("{e:#}"),
                    );
                    false
                }
            }
        } else {
            let Some(mapped) = build::map_source(&self.config, path) else {
                return false;
            };
            match build::copy_newer(path, &mapped.output) {
                Ok(_) => true,
                Err(e) => {
                    status_error(&path.display().to_string(), &format!("{e:#}"));
                    false
                }
            }
        }
    }

    /// Delete the output counterpart of a removed source file.
    fn remove_source_output(&self, path: &std::path::Path) {
        let Some(mapped) = build::map_source(&self.config, path) else {
            return;
        };
        if mapped.output.exists()
            && let Err(e) = std::fs::remove_file(&mapped.output)
        {
            crate::log!("watch"; "failed to remove {}: {}", mapped.output.display(), e);
        }
    }

    /// Rewrite the listing page after units came or went.
    fn refresh_listing(&self) {
        let Ok(units) = build::list_source_units(&self.config) else {
            return;
        };
        if let Err(e) =
            build::write_listing(self.config.output_root(), &self.config.project_name(), &units)
        {
            crate::log!("watch"; "listing refresh failed: {:#}", e);
        }
    }

    /// Archive every unit whose content fingerprint changed or whose
    /// archive artifact is missing, then refresh the size manifest.
    async fn run_zip_pass(&mut self, reason: &str) {
        crate::debug!("zip"; "pass triggered by {}", reason);
        let units = match build::list_source_units(&self.config) {
            Ok(units) => units,
            Err(e) => {
                crate::log!("zip"; "cannot list units: {:#}", e);
                return;
            }
        };

        let mut archived = 0;
        for unit in &units {
            let unit_dir = self.config.output_root().join(unit);
            if !unit_dir.is_dir() {
                continue;
            }
            let archive_path = archive_path_for(self.config.output_root(), unit);
            if !self.cache.should_archive(unit, &unit_dir, &archive_path) {
                continue;
            }
            match archive_unit(&unit_dir, &archive_path) {
                Ok(bytes) => {
                    crate::debug!("zip"; "{}.zip ({} bytes)", unit, bytes);
                    archived += 1;
                }
                Err(e) => crate::log!("zip"; "{}: {:#}", unit, e),
            }
        }

        if archived == 0 {
            crate::debug!("zip"; "archives up to date");
        } else {
            crate::log!("zip"; "{archived} archive(s) refreshed");
        }

        // Manifest and reload follow every pass, even a no-change one: an
        // externally deleted or stale manifest heals on the next pass
        if let Err(e) = write_manifest(self.config.output_root()) {
            crate::log!("zip"; "manifest: {:#}", e);
        }
        self.reload("archives updated").await;
    }

    /// Sweep orphaned output, then refresh manifest and listing if
    /// anything was removed.
    async fn run_reconcile_pass(&mut self) {
        let removed = reconcile_output(&self.config);
        if removed.is_empty() {
            crate::debug!("watch"; "reconcile: nothing to sweep");
            return;
        }

        if let Err(e) = write_manifest(self.config.output_root()) {
            crate::log!("watch"; "manifest: {:#}", e);
        }
        self.refresh_listing();
        crate::log!("watch"; "swept orphaned output: {}", removed.join(", "));
        self.reload("orphans removed").await;
    }

    async fn reload(&self, reason: &str) {
        let _ = self
            .reload_tx
            .send(ReloadMsg::Reload {
                reason: reason.to_string(),
            })
            .await;
    }
}
