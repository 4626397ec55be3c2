#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut dir = std::env::temp_dir();
    dir.push(format!("hexmerge_{prefix}_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(path: &Path, data: &[u8]) {
    std::fs::write(path, data).unwrap();
}

pub fn run_hexmerge(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hexmerge"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("hexmerge failed: {stderr}");
    }
}

/// Build one Intel-HEX record with a valid checksum.
pub fn hex_record(address: u16, record_type: u8, data: &[u8]) -> String {
    let [hi, lo] = address.to_be_bytes();
    let mut sum = (data.len() as u8)
        .wrapping_add(hi)
        .wrapping_add(lo)
        .wrapping_add(record_type);
    let mut line = format!(":{:02X}{:04X}{:02X}", data.len(), address, record_type);
    for &b in data {
        sum = sum.wrapping_add(b);
        line.push_str(&format!("{b:02X}"));
    }
    line.push_str(&format!("{:02X}\n", sum.wrapping_neg()));
    line
}

pub fn hex_eof() -> String {
    hex_record(0, 0x01, &[])
}
