use super::commands::ListKind;
use super::output::print_json;
use crate::client::RedashApi;

pub fn run_list<A: RedashApi>(api: &A, kind: ListKind) -> anyhow::Result<()> {
    match kind {
        ListKind::Datasources => print_json(&api.list_datasources()?),
        ListKind::Queries => print_json(&api.list_queries()?),
        ListKind::Groups => print_json(&api.list_groups()?),
        ListKind::Users => print_json(&api.list_users()?),
        ListKind::Dashboards => print_json(&api.list_dashboards()?),
        ListKind::Alerts => print_json(&api.list_alerts()?),
    }
}
