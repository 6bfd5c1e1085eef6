use std::fmt;

use crate::console;

pub const BACK_CAMERA_HINTS: [&str; 4] = ["back", "rear", "environment", "camera 1"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoRequest<'a> {
    EnvironmentFacing,
    Device(&'a str),
    AnyCamera,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoInput {
    pub device_id: String,
    pub label: String,
}

impl VideoInput {
    pub fn looks_like_back_camera(&self) -> bool {
        let label = self.label.to_lowercase();
        BACK_CAMERA_HINTS.iter().any(|hint| label.contains(hint))
    }
}

pub fn find_back_camera(inputs: &[VideoInput]) -> Option<&VideoInput> {
    inputs.iter().find(|input| input.looks_like_back_camera())
}

pub trait StreamHandle {
    fn stop(&self);
}

#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    type Stream: StreamHandle;

    async fn open(&self, request: VideoRequest<'_>) -> Result<Self::Stream, String>;

    async fn video_inputs(&self) -> Result<Vec<VideoInput>, String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraTier {
    EnvironmentFacing,
    LabeledBackCamera,
    AnyCamera,
}

impl CameraTier {
    pub fn name(self) -> &'static str {
        match self {
            CameraTier::EnvironmentFacing => "facingMode exact environment",
            CameraTier::LabeledBackCamera => "labelled back camera",
            CameraTier::AnyCamera => "default camera",
        }
    }
}

#[derive(Debug)]
pub struct Acquired<S> {
    pub stream: S,
    pub tier: CameraTier,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraError {
    reason: String,
}

impl CameraError {
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no camera available: {}", self.reason)
    }
}

impl std::error::Error for CameraError {}

pub async fn acquire<B: MediaBackend>(backend: &B) -> Result<Acquired<B::Stream>, CameraError> {
    match backend.open(VideoRequest::EnvironmentFacing).await {
        Ok(stream) => return Ok(found(stream, CameraTier::EnvironmentFacing)),
        Err(err) => console::warn(&format!("facingMode exact failed: {err}")),
    }

    match backend.video_inputs().await {
        Ok(inputs) => {
            if let Some(input) = find_back_camera(&inputs) {
                match backend.open(VideoRequest::Device(&input.device_id)).await {
                    Ok(stream) => return Ok(found(stream, CameraTier::LabeledBackCamera)),
                    Err(err) => console::warn(&format!(
                        "deviceId request for {:?} failed: {err}",
                        input.label
                    )),
                }
            }
        }
        Err(err) => console::warn(&format!("enumerateDevices failed: {err}")),
    }

    match backend.open(VideoRequest::AnyCamera).await {
        Ok(stream) => Ok(found(stream, CameraTier::AnyCamera)),
        Err(reason) => {
            console::error(&format!("fallback getUserMedia failed: {reason}"));
            Err(CameraError { reason })
        }
    }
}

fn found<S>(stream: S, tier: CameraTier) -> Acquired<S> {
    console::info(&format!("camera activated via {}", tier.name()));
    Acquired { stream, tier }
}

pub struct CameraSlot<S> {
    active: Option<S>,
}

impl<S> Default for CameraSlot<S> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<S: StreamHandle> CameraSlot<S> {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&S> {
        self.active.as_ref()
    }

    /// Stops every track of the current stream, if any.
    pub fn release(&mut self) {
        if let Some(stream) = self.active.take() {
            stream.stop();
        }
    }

    pub fn install(&mut self, stream: S) -> &S {
        self.release();
        self.active.insert(stream)
    }
}
