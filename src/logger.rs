use std::path::Path;
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "zilo.log";

// RUST_LOG がない場合の既定レベル
#[cfg(debug_assertions)]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(debug_assertions))]
const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// ログをファイルに出力するよう初期化する (標準出力は画面描画に使うため)
///
/// 返り値のガードが drop されるまでログが書き込まれる。既にグローバルな
/// subscriber が登録されている場合は `None`。
pub fn init(dir: &Path) -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

/// panic の内容をログに残してから既定のフックに渡す
pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", %info, "panic");
            default_panic(info);
        }));
    });
}
