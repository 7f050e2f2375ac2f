use std::path::Path;

use super::output::{ensure_succeeded, print_json};
use crate::client::RedashApi;
use crate::declare::StateFile;
use crate::reconcile::Reconciler;

pub fn run_apply<A: RedashApi>(reconciler: &Reconciler<A>, file: &Path) -> anyhow::Result<()> {
    let states = StateFile::load(file)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", file.display()))?;

    let reports = reconciler.apply_all(&states);
    print_json(&reports)?;
    ensure_succeeded(&reports)
}
