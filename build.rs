// build.rs

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Only the X11 host links against native libraries.
    if std::env::var_os("CARGO_FEATURE_X11_HOST").is_none() {
        return;
    }

    // Try pkg-config first, fall back to plain linker flags if it is missing
    // or the .pc file cannot be found.
    if let Err(e) = pkg_config::probe_library("x11") {
        eprintln!(
            "pkg-config failed for library 'x11' ({}). Falling back to manual linking.",
            e
        );
        println!("cargo:rustc-link-lib=X11");
        println!("cargo:rustc-link-search=/usr/lib");
        eprintln!("Manual linking flags applied. Ensure the X11 development libraries are installed.");
    } else {
        eprintln!("pkg-config found X11. Linking configured automatically.");
    }
}
