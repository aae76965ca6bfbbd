mod cli;
mod logger;
mod workflow;

use clap::Parser;
use image_pdf_assembler::error::AppError;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // コマンドライン引数を解析します
    let args = cli::Args::parse();

    match start(args).await {
        Ok(()) => ExitCode::SUCCESS,
        // ロガーが使えないので標準エラーに直接出す
        Err(e @ AppError::Logger(_)) => {
            eprintln!("エラー: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn start(args: cli::Args) -> Result<(), AppError> {
    logger::CliLogger::new(args.verbose).init()?;
    workflow::run(args).await
}
