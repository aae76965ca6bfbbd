use clap::{Parser, ValueEnum};
use image_pdf_assembler::domain::orientation::OrientationMode;
use image_pdf_assembler::domain::page_layout::PaperSize;
use std::path::PathBuf;

/// 画像ファイル・フォルダ・ZIPファイルの画像を、1画像1ページの PDF にまとめるツール
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 変換する画像ファイル、画像を含むフォルダ、またはZIPファイルのパス (指定順に並ぶ)
    pub inputs: Vec<PathBuf>,

    /// PDFの出力先フォルダのパス (オプション: デフォルトはカレントディレクトリ)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// JPEG の品質 (0.0〜1.0)
    #[arg(short, long, default_value_t = 0.8)]
    pub quality: f32,

    /// ページの向き
    #[arg(long, value_enum, default_value_t = OrientationArg::Auto)]
    pub orientation: OrientationArg,

    /// 用紙サイズ
    #[arg(long, value_enum, default_value_t = PaperArg::A4)]
    pub paper: PaperArg,

    /// 出力ファイル名の接頭辞 (例: document_1718000000000.pdf)
    #[arg(long, default_value = "document")]
    pub name_prefix: String,

    /// 変換前に画像を移動する (1始まりの位置、FROM:TO)。複数指定すると順に適用される
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<MoveArg>,

    /// 変換前に取り除く画像の番号 (読み込み時に表示される #番号)
    #[arg(long = "remove", value_name = "ID")]
    pub removals: Vec<u64>,

    /// 読み込んだ画像をすべて消去する (--yes が必要)
    #[arg(long)]
    pub clear: bool,

    /// --clear の確認を省略する
    #[arg(short, long)]
    pub yes: bool,

    /// 詳細なログを表示する
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    /// 横長の画像は横向き、それ以外は縦向き
    Auto,
    Portrait,
    Landscape,
}

impl From<OrientationArg> for OrientationMode {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Auto => OrientationMode::Auto,
            OrientationArg::Portrait => OrientationMode::Portrait,
            OrientationArg::Landscape => OrientationMode::Landscape,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => PaperSize::A3,
            PaperArg::A4 => PaperSize::A4,
            PaperArg::A5 => PaperSize::A5,
            PaperArg::Letter => PaperSize::Letter,
            PaperArg::Legal => PaperSize::Legal,
        }
    }
}

/// `--move` の1指定分。位置は 0 始まりに変換済み。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveArg {
    pub from: usize,
    pub to: usize,
}

fn parse_move(value: &str) -> Result<MoveArg, String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("'{}' は FROM:TO の形式ではありません", value))?;
    Ok(MoveArg {
        from: parse_position(from)?,
        to: parse_position(to)?,
    })
}

fn parse_position(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("'{}' は 1 以上の位置ではありません", value)),
        Ok(position) => Ok(position - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_plain_invocation() {
        let args = Args::try_parse_from(["image_pdf_assembler", "a.png", "photos"]).unwrap();
        assert_eq!(args.inputs, vec![PathBuf::from("a.png"), PathBuf::from("photos")]);
        assert_eq!(args.quality, 0.8);
        assert_eq!(args.orientation, OrientationArg::Auto);
        assert_eq!(args.paper, PaperArg::A4);
        assert_eq!(args.name_prefix, "document");
        assert!(args.output_dir.is_none());
        assert!(args.moves.is_empty() && args.removals.is_empty());
        assert!(!args.clear && !args.yes && !args.verbose);
    }

    #[test]
    fn edits_are_collected_in_order() {
        let args = Args::try_parse_from([
            "image_pdf_assembler",
            "scans.zip",
            "--move",
            "3:1",
            "--move",
            "1:2",
            "--remove",
            "4",
            "--orientation",
            "landscape",
            "--paper",
            "letter",
        ])
        .unwrap();
        assert_eq!(
            args.moves,
            vec![MoveArg { from: 2, to: 0 }, MoveArg { from: 0, to: 1 }]
        );
        assert_eq!(args.removals, vec![4]);
        assert_eq!(OrientationMode::from(args.orientation), OrientationMode::Landscape);
        assert_eq!(PaperSize::from(args.paper), PaperSize::Letter);
    }

    #[test]
    fn malformed_moves_are_rejected() {
        assert!(parse_move("3").is_err());
        assert!(parse_move("0:1").is_err());
        assert!(parse_move("a:1").is_err());
        assert_eq!(parse_move(" 2 : 5 "), Ok(MoveArg { from: 1, to: 4 }));
    }
}
