//! Fixed table of primitive intrinsic operations (spec.md §4.3.9, §6).
//! Adding one is "a matter of table extension"; `sub#`/`mul#`/`div#`
//! give the `-`/`*`/`/` glyphs (spec.md §9, first open question) a
//! named intrinsic home alongside the spec-mandated `plus#`.

pub fn lookup(name: &str) -> Option<fn(i64, i64) -> i64> {
    match name {
        "plus#" => Some(|a, b| a + b),
        "sub#" => Some(|a, b| a - b),
        "mul#" => Some(|a, b| a * b),
        "div#" => Some(|a, b| a / b),
        _ => None,
    }
}
