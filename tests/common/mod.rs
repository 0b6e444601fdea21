#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::Workbook;

/// A cell written into a generated workbook.
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Empty,
}

pub use Cell::{Empty, Number as N, Text as T};

/// A fresh, unique directory under the system temp dir.
pub fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("rust-vm-inventory-{name}-{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write `sheets` (name, header, rows) to `dir/file_name` as `.xlsx`.
pub fn write_workbook(dir: &Path, file_name: &str, sheets: &[(&str, &[&str], Vec<Vec<Cell<'_>>>)]) {
    let mut wb = Workbook::new();
    for (name, headers, rows) in sheets {
        let ws = wb.add_worksheet();
        ws.set_name(*name).unwrap();
        for (c, h) in headers.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => {
                        ws.write_string(r, c, *s).unwrap();
                    }
                    Cell::Number(n) => {
                        ws.write_number(r, c, *n).unwrap();
                    }
                    Cell::Empty => {}
                }
            }
        }
    }
    wb.save(dir.join(file_name)).unwrap();
}

pub const LIVE_OPTICS_VMS: [&str; 15] = [
    "MOB ID",
    "VM Name",
    "Cluster",
    "Datacenter",
    "VM OS",
    "Guest Hostname",
    "Power State",
    "Virtual CPU",
    "Provisioned Memory (MiB)",
    "Virtual Disk Size (MiB)",
    "Virtual Disk Used (MiB)",
    "Guest IP1",
    "Guest IP2",
    "Guest IP3",
    "Guest IP4",
];

pub const LIVE_OPTICS_PERF: [&str; 9] = [
    "MOB ID",
    "Avg Read IOPS",
    "Avg Write IOPS",
    "Peak Read IOPS",
    "Peak Write IOPS",
    "Avg Read MB/s",
    "Avg Write MB/s",
    "Peak Read MB/s",
    "Peak Write MB/s",
];

/// Live Optics headers with `(MiB)` replaced by `(MB)`.
pub fn live_optics_vms_mb() -> Vec<String> {
    LIVE_OPTICS_VMS.iter().map(|h| h.replace("(MiB)", "(MB)")).collect()
}

/// Three VMs; `vm-3` has no row in `VM Performance`.
pub fn live_optics_rows() -> (Vec<Vec<Cell<'static>>>, Vec<Vec<Cell<'static>>>) {
    let vms = vec![
        vec![
            T("vm-1"), T("web01"), T("prod"), T("dc-east"), T("Ubuntu Linux (64-bit)"), T("web01.corp"),
            T("poweredOn"), N(4.0), N(8192.0), N(51712.0), N(20480.0), T("10.0.0.1"), Empty, Empty, Empty,
        ],
        vec![
            T("vm-2"), T("db01"), T("prod"), T("dc-east"), T("Microsoft Windows Server 2019"), T("db01.corp"),
            T("poweredOn"), N(8.0), N(32768.0), N(204800.0), N(102400.0), T("10.0.0.2"), T("10.0.1.2"), Empty, Empty,
        ],
        vec![
            T("vm-3"), T("old01"), T("dev"), T("dc-west"), Empty, Empty,
            T("poweredOff"), N(2.0), N(4096.0), N(10240.0), N(0.0), Empty, Empty, Empty, Empty,
        ],
    ];
    let perf = vec![
        vec![T("vm-1"), N(120.0), N(40.0), N(900.0), N(300.0), N(5.5), N(1.5), N(40.0), N(12.0)],
        vec![T("vm-2"), N(800.0), N(650.0), N(4000.0), N(3500.0), N(60.0), N(45.0), N(250.0), N(200.0)],
    ];
    (vms, perf)
}

pub const RVTOOLS_VINFO: [&str; 12] = [
    "VM ID",
    "VM",
    "Cluster",
    "Datacenter",
    "Primary IP Address",
    "OS according to the VMware Tools",
    "DNS Name",
    "Powerstate",
    "CPUs",
    "Memory",
    "Provisioned MiB",
    "In Use MiB",
];

/// Write an RVTools workbook with `vm-1` (two disks of 50 and 30 GiB, partitions) and
/// `vm-2` (no disks, no partitions).
pub fn write_rvtools(dir: &Path, file_name: &str) {
    let vinfo = vec![
        vec![
            T("vm-1"), T("app01"), T("prod"), T("dc-east"), T("10.1.0.1"), T("Red Hat Enterprise Linux 8"),
            T("app01.corp"), T("poweredOn"), N(4.0), N(16384.0), N(102400.0), N(61440.0),
        ],
        vec![
            T("vm-2"), T("tmpl01"), T("prod"), T("dc-east"), Empty, Empty,
            Empty, T("poweredOff"), N(2.0), N(4096.0), N(40960.0), N(8192.0),
        ],
    ];
    let vdisk = vec![
        vec![T("vm-1"), N(51200.0)],
        vec![T("vm-1"), N(30720.0)],
    ];
    let vpartition = vec![
        vec![T("vm-1"), N(10240.0)],
        vec![T("vm-1"), N(5120.0)],
    ];
    write_workbook(
        dir,
        file_name,
        &[
            ("vInfo", &RVTOOLS_VINFO[..], vinfo),
            ("vDisk", &["VM ID", "Capacity MiB"][..], vdisk),
            ("vPartition", &["VM ID", "Consumed MiB"][..], vpartition),
        ],
    );
}
