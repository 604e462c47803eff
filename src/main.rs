//! Drone - Rust Agent 调用桥接
//!
//! 入口：初始化日志、创建桥接实例；带参数时单次调用并打印回复，
//! 无参数时进入逐行对话循环。

use std::io::{BufRead, Write};

use drone::create_agent;
use futures_util::StreamExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    drone::observability::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let bridge = create_agent("config", None);
    tracing::info!("Bridge ready ({:?} backend)", bridge.backend_kind());

    // 单次模式：drone "你的问题"
    if !args.is_empty() {
        let message = args.join(" ");
        let mut chunks = bridge.stream(&message, None, None).await?;
        while let Some(chunk) = chunks.next().await {
            println!("{}", chunk);
        }
        return Ok(());
    }

    // 对话循环：逐行读 stdin，空行退出
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        match bridge.invoke(message, None, None).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}
