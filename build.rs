use std::env;
use std::path::Path;

fn main() {
    for variable in ["FFMPEG_DIR", "PKG_CONFIG_PATH", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if let Some(dir) = env::var_os("FFMPEG_DIR") {
        if !Path::new(&dir).join("include").exists() {
            println!(
                "cargo:warning=FFMPEG_DIR={} has no include/ directory; ffmpeg-sys-next will likely fail to find headers.",
                Path::new(&dir).display(),
            );
        }
        return;
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=FFMPEG_DIR is not set. On Windows install FFmpeg with vcpkg and point FFMPEG_DIR at the installed triplet."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = Path::new(&vcpkg_root).join("installed").join(&triplet);
    if candidate.exists() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it explicitly.",
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist.",
            candidate.display(),
        );
    }
}
