#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, Stream};
use tokio::time::Instant;

use robot_order_submit::models::order_form::{ROBOT_PREVIEW, SUBMIT_BUTTON, SUCCESS_MARKER};
use robot_order_submit::services::pdf_pages::{self, PAGE_HEIGHT, PAGE_WIDTH};
use robot_order_submit::services::{BundleArchiver, DocumentRenderer, ZipArchiver};
use robot_order_submit::{AppError, Config, FormDriver};

/// 驱动、渲染器、打包器共享的事件日志
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn count(log: &EventLog, event: &str) -> usize {
    log.lock().unwrap().iter().filter(|e| e.as_str() == event).count()
}

/// 测试用配置：不等待、不限重试
pub fn test_config() -> Config {
    Config {
        settle_delay_ms: 0,
        slow_mo_ms: 0,
        ..Config::default()
    }
}

#[derive(Default)]
struct SubmitState {
    /// 每个订单前几次提交失败
    plan: VecDeque<usize>,
    remaining: Option<usize>,
    confirmed: bool,
}

/// 按脚本响应的表单驱动
///
/// 每个订单按 `plan` 中的次数先失败，再成功
pub struct ScriptedDriver {
    log: EventLog,
    state: Mutex<SubmitState>,
    preview_available: bool,
    snapshot_size: (u32, u32),
    /// 每个驱动事件发生的时刻
    timeline: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedDriver {
    pub fn new(log: EventLog, failures_per_order: impl IntoIterator<Item = usize>) -> Self {
        Self {
            log,
            state: Mutex::new(SubmitState {
                plan: failures_per_order.into_iter().collect(),
                ..Default::default()
            }),
            preview_available: true,
            snapshot_size: (640, 480),
            timeline: Mutex::new(Vec::new()),
        }
    }

    pub fn without_preview(mut self) -> Self {
        self.preview_available = false;
        self
    }

    pub fn with_snapshot_size(mut self, width: u32, height: u32) -> Self {
        self.snapshot_size = (width, height);
        self
    }

    pub fn timeline(&self) -> Vec<(String, Instant)> {
        self.timeline.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.timeline
            .lock()
            .unwrap()
            .push((event.clone(), Instant::now()));
        self.log.lock().unwrap().push(event);
    }
}

#[async_trait]
impl FormDriver for ScriptedDriver {
    type Element = String;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click {}", selector));
        let mut state = self.state.lock().unwrap();
        if selector == SUBMIT_BUTTON {
            let remaining = match state.remaining {
                Some(n) => n,
                None => state.plan.pop_front().unwrap_or(0),
            };
            if remaining > 0 {
                state.remaining = Some(remaining - 1);
            } else {
                state.remaining = None;
                state.confirmed = true;
            }
        } else if selector == SUCCESS_MARKER {
            state.confirmed = false;
        }
        Ok(())
    }

    async fn click_text(&self, text: &str) -> Result<()> {
        self.record(format!("click_text {}", text));
        Ok(())
    }

    async fn select_option(&self, selector: &str, label: &str) -> Result<()> {
        self.record(format!("select {} {}", selector, label));
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.record(format!("fill {} {}", selector, text));
        Ok(())
    }

    async fn query_optional(&self, selector: &str) -> Result<Option<String>> {
        let found = if selector == SUCCESS_MARKER {
            self.state.lock().unwrap().confirmed
        } else if selector == ROBOT_PREVIEW {
            self.preview_available
        } else {
            true
        };
        self.record(format!("query {} {}", selector, found));
        Ok(found.then(|| selector.to_string()))
    }

    async fn screenshot_element(&self, element: &String, path: &Path) -> Result<()> {
        self.record(format!("screenshot {}", element));
        let (w, h) = self.snapshot_size;
        RgbImage::from_pixel(w, h, Rgb([30, 144, 255])).save(path)?;
        Ok(())
    }

    async fn inner_html(&self, selector: &str) -> Result<String> {
        self.record(format!("inner_html {}", selector));
        Ok("<h3>Receipt</h3><p>Thank you for your order!</p>".to_string())
    }
}

/// 把 HTML 写成一页纯文本 PDF 的渲染器，追加截图走真实实现
pub struct TextPdfRenderer {
    log: EventLog,
}

impl TextPdfRenderer {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl DocumentRenderer for TextPdfRenderer {
    async fn html_to_document(&self, markup: &str, path: &Path) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("render {}", path.display()));
        write_text_pdf(path, markup);
        Ok(())
    }
}

pub fn write_text_pdf(path: &Path, text: &str) {
    let mut doc = pdf_pages::empty_document();
    let root_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let pages_id = doc
        .get_object(root_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Pages")
        .unwrap()
        .as_reference()
        .unwrap();

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Contents" => content_id,
    });

    let pages = doc.get_object_mut(pages_id).unwrap().as_dict_mut().unwrap();
    pages
        .get_mut(b"Kids")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .push(Object::Reference(page_id));
    pages.set("Count", 1);
    doc.save(path).unwrap();
}

/// 记录调用并委托给真实 zip 实现的打包器
pub struct RecordingArchiver {
    log: EventLog,
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingArchiver {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BundleArchiver for RecordingArchiver {
    async fn archive_folder(&self, source: &Path, dest: &Path) -> Result<usize> {
        self.log.lock().unwrap().push("archive".to_string());
        self.calls
            .lock()
            .unwrap()
            .push((source.to_path_buf(), dest.to_path_buf()));
        ZipArchiver.archive_folder(source, dest).await
    }
}

pub fn app_error(err: &anyhow::Error) -> &AppError {
    err.downcast_ref::<AppError>()
        .unwrap_or_else(|| panic!("not an AppError: {:#}", err))
}
