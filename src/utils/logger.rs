// 日誌工具

/// 初始化日誌（輸出到 stderr）
///
/// `debug` 為真時強制 Debug 等級；否則若有設定 RUST_LOG 則依其設定，預設只顯示 Error。
pub fn init_logger(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None);

    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Error);
    }

    // 測試中可能重複初始化
    let _ = builder.try_init();
}
