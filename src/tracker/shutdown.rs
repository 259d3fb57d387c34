use tokio::select;
use tokio_util::sync::CancellationToken;

/// Turns Ctrl-C into a cancellation. Also finishes when something else cancels the token first,
/// for example the user typing `quit`, so a joined caller never hangs on this arm.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {}
    };
}
