use serde::Serialize;

use crate::report::ChangeReport;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fails when any report did not succeed, after they have been printed.
pub fn ensure_succeeded(reports: &[ChangeReport]) -> anyhow::Result<()> {
    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| !r.succeeded)
        .map(|r| r.name.as_str())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} states failed: {}",
            failed.len(),
            reports.len(),
            failed.join(", ")
        )
    }
}
