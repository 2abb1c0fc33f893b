//! Partition idle time from `@Statistics STARVATION`.
//!
//! Only the polled host gets per-site detail; other hosts are reduced to a
//! min/max envelope. Each host's highest site id runs the multi-partition
//! initiator and is reported separately.

use std::collections::HashMap;

use common::models::metrics::PartitionIdleView;
use common::response::ResultTable;

use crate::columns::ColumnMap;

pub fn extract(table: &ResultTable, local_host: &str, target: &mut PartitionIdleView) {
    let columns = ColumnMap::resolve(table, &["HOSTNAME", "SITE_ID", "PERCENT", "TIMESTAMP"]);

    // The MPI runs on each host's highest site id.
    let mut mpi_site: HashMap<String, i64> = HashMap::new();
    for row in &table.data {
        let (Some(host), Some(site)) =
            (columns.string(row, "HOSTNAME"), columns.i64(row, "SITE_ID"))
        else {
            continue;
        };
        let entry = mpi_site.entry(host).or_insert(site);
        *entry = (*entry).max(site);
    }

    for row in &table.data {
        let (Some(host), Some(site), Some(percent)) = (
            columns.string(row, "HOSTNAME"),
            columns.i64(row, "SITE_ID"),
            columns.f64(row, "PERCENT"),
        ) else {
            continue;
        };
        target.timestamp = columns.i64(row, "TIMESTAMP").unwrap_or(target.timestamp);

        let is_mpi = mpi_site.get(&host) == Some(&site);
        let key = format!("{host}: {site}");
        if host == local_host {
            if is_mpi {
                target.mpi.insert(key, percent);
            } else {
                target.sites.insert(key, percent);
            }
        } else if !is_mpi {
            let min = target.host_min.entry(host.clone()).or_insert(percent);
            *min = min.min(percent);
            let max = target.host_max.entry(host).or_insert(percent);
            *max = max.max(percent);
        }
    }
}
