//! Host battery level for the status bar, read from sysfs.

use crate::app::events::{Event, TaskEvent};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";
const REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub percent: u8,
    pub charging: bool,
}

/// `None` when the host has no readable battery; the indicator is hidden
/// then.
pub fn read_battery() -> Option<BatteryStatus> {
    read_battery_from(Path::new(POWER_SUPPLY_DIR))
}

fn read_battery_from(root: &Path) -> Option<BatteryStatus> {
    let mut supplies: Vec<_> = std::fs::read_dir(root)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    supplies.sort();
    supplies.iter().find_map(|dir| read_supply(dir))
}

fn read_supply(dir: &Path) -> Option<BatteryStatus> {
    let read = |name: &str| std::fs::read_to_string(dir.join(name)).ok();
    if read("type")?.trim() != "Battery" {
        return None;
    }
    let percent: u8 = read("capacity")?.trim().parse().ok()?;
    let charging = read("status").is_some_and(|s| matches!(s.trim(), "Charging" | "Full"));
    Some(BatteryStatus {
        percent: percent.min(100),
        charging,
    })
}

/// Reports the battery once now and then on a fixed interval.
pub fn spawn_battery_task(tx: mpsc::Sender<Event>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REFRESH);
        loop {
            ticker.tick().await;
            let status = tokio::task::spawn_blocking(read_battery).await.unwrap_or(None);
            if tx.send(Event::Task(TaskEvent::Battery(status))).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn supply(root: &Path, name: &str, kind: &str, capacity: &str, status: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{kind}\n")).unwrap();
        fs::write(dir.join("capacity"), format!("{capacity}\n")).unwrap();
        fs::write(dir.join("status"), format!("{status}\n")).unwrap();
    }

    #[test]
    fn test_reads_first_battery() {
        let tmp = tempfile::tempdir().unwrap();
        supply(tmp.path(), "AC", "Mains", "0", "Unknown");
        supply(tmp.path(), "BAT0", "Battery", "73", "Charging");
        assert_eq!(
            read_battery_from(tmp.path()),
            Some(BatteryStatus {
                percent: 73,
                charging: true
            })
        );
    }

    #[test]
    fn test_unsupported_host_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(read_battery_from(tmp.path()), None);
        assert_eq!(read_battery_from(&tmp.path().join("missing")), None);

        supply(tmp.path(), "BAT0", "Battery", "garbage", "Discharging");
        assert_eq!(read_battery_from(tmp.path()), None);
    }
}
