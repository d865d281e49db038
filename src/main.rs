use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing::{info, warn};

use study_buddy::app::export::save_result;
use study_buddy::app::render::{RenderOptions, render_text_with};
use study_buddy::{AppConfig, ArtifactKind, HttpBackend, RequestGateway, SessionPhase, StudySession, ViewModel, logger};

const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

#[derive(Parser, Debug)]
#[command(name = "study-buddy")]
#[command(about = "Turn a photo of study material into a summary, explanation, quiz or notes")]
struct Args {
    /// 图片路径
    image: PathBuf,

    /// 分析类型: summarize / explain / quiz / notes
    #[arg(long)]
    kind: Option<ArtifactKind>,

    /// 用识别出的文本继续生成其它类型，可重复
    #[arg(long = "then")]
    then: Vec<ArtifactKind>,

    #[arg(long)]
    config: Option<PathBuf>,

    /// 覆盖配置中的服务地址
    #[arg(long)]
    api_url: Option<String>,

    /// 以 JSON 输出视图
    #[arg(long)]
    json: bool,

    /// 同时输出识别出的原文
    #[arg(long)]
    show_text: bool,

    /// 把每一步的 AI 原始结果保存到该目录
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,
}

fn read_image(path: &Path) -> Result<(Vec<u8>, String, String)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "不支持的图片格式 '{}'，支持: {}",
            path.display(),
            ACCEPTED_EXTENSIONS.join(", ")
        );
    }

    let mime = mime_guess::from_path(path)
        .first()
        .ok_or_else(|| anyhow!("无法识别文件类型: {}", path.display()))?;
    let bytes = fs::read(path).with_context(|| format!("读取图片失败: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok((bytes, file_name, mime.essence_str().to_string()))
}

fn print_view(view: &ViewModel, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        let options = RenderOptions {
            show_extracted_text: args.show_text,
        };
        println!("{}", render_text_with(view, options));
    }
    if let (Some(dir), ViewModel::ShowResult(result)) = (&args.save, view) {
        save_result(dir, result)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    logger::init(&config.log_level);

    info!("🚀 服务地址: {}", config.api_base_url);
    let backend = HttpBackend::from_config(&config)?;
    let gateway = RequestGateway::new(Arc::new(backend), config.max_image_bytes);
    let mut session = StudySession::new(gateway);

    let kind = args.kind.unwrap_or(config.default_kind);
    let (bytes, file_name, mime) = read_image(&args.image)?;

    session.submit_image(bytes, &file_name, &mime, kind).await?;
    print_view(&session.view(), &args)?;

    for &next in &args.then {
        if session.state().phase() != SessionPhase::Success {
            warn!("上一步未成功，跳过后续分析");
            break;
        }
        info!("{}", "=".repeat(60));
        session.reprocess(next).await?;
        print_view(&session.view(), &args)?;
    }

    if let Some(message) = session.state().error_message() {
        bail!("{}", message);
    }
    Ok(())
}
