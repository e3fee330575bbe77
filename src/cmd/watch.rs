//! Live board view: `taskboard watch`.

use anyhow::Result;
use taskboard::watch::BoardWatcher;

use super::board::render_board;

pub async fn cmd_watch(url: &str) -> Result<()> {
    let mut watcher = BoardWatcher::connect(url).await?;
    loop {
        tokio::select! {
            update = watcher.next_update() => match update? {
                Some(board) => {
                    println!("── board-update ──");
                    print!("{}", render_board(board));
                }
                None => {
                    println!("Server closed the sync channel.");
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    watcher.close().await?;
    Ok(())
}
