#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    if let Err(e) = all_in_poster_lib::desktop::run() {
        eprintln!("[all-in-poster] {e:#}");
        std::process::exit(1);
    }
}
