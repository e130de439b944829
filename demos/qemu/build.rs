use std::{env, fs, path::Path};

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let out_dir = Path::new(&out_dir);

    fs::copy("memory.x", out_dir.join("memory.x")).unwrap();

    println!("cargo::rustc-link-search={}", out_dir.to_str().unwrap());
    println!("cargo::rerun-if-changed=memory.x");
}
