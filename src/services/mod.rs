//! Engine services: pure cadence/grouping logic plus the external service
//! clients and the two orchestration entry points (buffer audit, publish).

pub mod buffer_auditor;
pub mod caption_writer;
pub mod cycle_clock;
pub mod drive_client;
pub mod filename_parser;
pub mod gemini_client;
pub mod http;
pub mod notion_client;
pub mod post_publisher;
pub mod ready_counter;
pub mod sequence_grouper;
pub mod todoist_client;
pub mod vision_client;

pub use buffer_auditor::BufferAuditor;
pub use caption_writer::CaptionWriter;
pub use drive_client::{DriveClient, FileStore, RawFile};
pub use gemini_client::{CaptionModel, GeminiClient};
pub use notion_client::{DocumentService, NotionClient};
pub use post_publisher::PostPublisher;
pub use ready_counter::ReadyContentCounter;
pub use todoist_client::{TaskTracker, TodoistClient};
pub use vision_client::{ImageAnnotator, VisionClient};
