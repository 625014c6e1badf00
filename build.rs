fn main() {
    // Exposed as peckkit::BUILD_DATE; SOURCE_DATE_EPOCH pins it for
    // reproducible builds
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    let stamp = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(chrono::Utc::now);
    println!("cargo:rustc-env=BUILD_DATE={}", stamp.format("%Y-%m-%d"));
}
