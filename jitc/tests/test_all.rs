use jitc::*;

use std::fs;

fn read_dir(path: &str) -> Vec<String> {
    let dir = fs::read_dir(path).unwrap();
    dir.into_iter()
        .map(|x| x.unwrap().path().into_os_string().into_string().unwrap())
        .filter(|x| x.ends_with(".cfg"))
        .collect()
}

fn dummy_arg(path: &str, intervals: bool) -> Args {
    Args {
        target: "x86".to_string(),
        regs: None,
        intervals,
        no_cost_driven: false,
        spill_cheapest: false,
        no_reuse_regs: false,
        no_reuse_slots: false,
        save_lmf: false,
        max_vars: 2000,
        max_blocks: 1000,
        verbose: true,
        debug: false,
        sources: vec![path.to_string()],
    }
}

#[test]
fn test_all() {
    let srcs = read_dir("../tests/sources/");
    assert!(!srcs.is_empty());

    for src in srcs {
        for intervals in [false, true] {
            println!("testing {} (intervals: {})", src, intervals);
            assert!(compile(dummy_arg(&src, intervals)).is_ok());
        }
    }
}

#[test]
fn every_method_parses() {
    for src in read_dir("../tests/sources/") {
        let funcs = parse_file(&src).unwrap();
        assert!(!funcs.is_empty(), "{}", src);
    }
}

#[test]
fn unknown_target() {
    let mut args = dummy_arg("../tests/sources/diamond.cfg", false);
    args.target = "pdp11".to_string();
    assert!(compile(args).is_err());
}

#[test]
fn missing_file() {
    assert!(parse_file("../tests/sources/does_not_exist.cfg").is_err());
}
