//! Embed rpaths so the `embedpy` binary finds libpython at run time.

fn main() {
    println!("cargo:rerun-if-env-changed=PYO3_PYTHON");

    let Ok(target) = std::env::var("TARGET") else {
        return;
    };

    let mut rpaths: Vec<String> = Vec::new();
    if target.contains("apple-darwin") {
        rpaths.extend(["@executable_path", "@executable_path/../lib"].map(String::from));
        rpaths.push("/Library/Frameworks/Python.framework/Versions/Current/lib".to_string());
    } else if target.contains("linux") {
        rpaths.extend(["$ORIGIN", "$ORIGIN/../lib", "/usr/local/lib"].map(String::from));
    } else {
        return;
    }

    if let Some(libdir) = python_libdir() {
        rpaths.push(libdir);
    }

    for path in rpaths {
        println!("cargo:rustc-link-arg-bins=-Wl,-rpath,{path}");
    }
}

/// LIBDIR of the interpreter pyo3 builds against, when `PYO3_PYTHON` names one
fn python_libdir() -> Option<String> {
    let python = std::env::var("PYO3_PYTHON").ok()?;
    let output = std::process::Command::new(python)
        .args([
            "-c",
            "import sysconfig; print(sysconfig.get_config_var('LIBDIR') or '')",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let libdir = String::from_utf8(output.stdout).ok()?;
    let libdir = libdir.trim();
    (!libdir.is_empty()).then(|| libdir.to_string())
}
