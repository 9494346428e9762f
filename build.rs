fn main() {
    println!("cargo:rerun-if-env-changed=SENTINELA_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=SENTINELA_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=SENTINELA_BOT_TOKEN");
    println!("cargo:rerun-if-env-changed=SENTINELA_CHAT_ID");

    // Host builds (tests, fuzzing) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
