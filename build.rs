fn main() {
    println!("cargo:rerun-if-changed=assets/f1.ico");

    #[cfg(target_os = "windows")]
    {
        // The icon is optional; skip resource compilation when it is absent.
        if std::path::Path::new("assets/f1.ico").exists() {
            let mut res = winres::WindowsResource::new();
            res.set_icon("assets/f1.ico");
            res.compile().expect("Failed to compile Windows resources");
        }
    }
}
