use std::env;
use std::path::PathBuf;
use std::process::Command;

fn run(command: &mut Command) {
    let status = match command.status() {
        Ok(status) => status,
        Err(err) => panic!("failed to run {:?}: {}", command, err),
    };
    if !status.success() {
        panic!("{:?} exited with {}", command, status);
    }
}

fn main() {
    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    let manifest = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    let object = out.join("vectors.o");
    run(Command::new("msp430-elf-gcc")
        .args(["-mmcu=msp430g2553", "-c"])
        .arg(manifest.join("src/vectors.s"))
        .arg("-o")
        .arg(&object));
    run(Command::new("msp430-elf-ar").arg("crs").arg(out.join("libvectors.a")).arg(&object));

    std::fs::copy(manifest.join("link.ld"), out.join("link.ld")).unwrap();

    println!("cargo:rustc-link-search=native={}", out.display());
    println!("cargo:rustc-link-lib=static=vectors");

    // TI's MMC/SPI driver, built separately for the board
    if let Ok(dir) = env::var("MMC_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    println!("cargo:rustc-link-lib=static=mmc");

    println!("cargo:rerun-if-changed=src/vectors.s");
    println!("cargo:rerun-if-changed=link.ld");
    println!("cargo:rerun-if-env-changed=MMC_LIB_DIR");
}
