use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    HtmlVideoElement, MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaStream,
    MediaStreamConstraints, MediaStreamTrack, Window,
};

use crate::camera::{MediaBackend, StreamHandle, VideoInput, VideoRequest};
use crate::{console, js_value_to_string};

pub struct BrowserMedia {
    devices: MediaDevices,
}

impl BrowserMedia {
    pub fn from_window(window: &Window) -> Option<Self> {
        let nav_js: JsValue = window.navigator().into();
        let devices = Reflect::get(&nav_js, &JsValue::from_str("mediaDevices")).ok()?;
        if devices.is_undefined() || devices.is_null() {
            return None;
        }
        let has_get_user_media =
            Reflect::has(&devices, &JsValue::from_str("getUserMedia")).unwrap_or(false);
        if !has_get_user_media {
            return None;
        }
        devices
            .dyn_into::<MediaDevices>()
            .ok()
            .map(|devices| Self { devices })
    }
}

fn exact(key: &str, value: &str) -> Result<JsValue, JsValue> {
    let exact = Object::new();
    Reflect::set(&exact, &JsValue::from_str("exact"), &JsValue::from_str(value))?;
    let constraint = Object::new();
    Reflect::set(&constraint, &JsValue::from_str(key), &exact)?;
    Ok(constraint.into())
}

fn constraints(request: VideoRequest<'_>) -> Result<MediaStreamConstraints, JsValue> {
    let video = match request {
        VideoRequest::EnvironmentFacing => exact("facingMode", "environment")?,
        VideoRequest::Device(device_id) => exact("deviceId", device_id)?,
        VideoRequest::AnyCamera => JsValue::TRUE,
    };
    let constraints = Object::new();
    Reflect::set(&constraints, &JsValue::from_str("video"), &video)?;
    Reflect::set(&constraints, &JsValue::from_str("audio"), &JsValue::FALSE)?;
    Ok(constraints.unchecked_into())
}

impl BrowserMedia {
    async fn open_js(&self, request: VideoRequest<'_>) -> Result<MediaStream, JsValue> {
        let constraints = constraints(request)?;
        let promise = self.devices.get_user_media_with_constraints(&constraints)?;
        let stream = JsFuture::from(promise).await?;
        stream.dyn_into::<MediaStream>()
    }

    async fn video_inputs_js(&self) -> Result<Vec<VideoInput>, JsValue> {
        let listed = JsFuture::from(self.devices.enumerate_devices()?).await?;
        let inputs = Array::from(&listed)
            .iter()
            .filter_map(|value| value.dyn_into::<MediaDeviceInfo>().ok())
            .filter(|info| info.kind() == MediaDeviceKind::Videoinput)
            .map(|info| VideoInput {
                device_id: info.device_id(),
                label: info.label(),
            })
            .collect();
        Ok(inputs)
    }
}

impl MediaBackend for BrowserMedia {
    type Stream = MediaStream;

    async fn open(&self, request: VideoRequest<'_>) -> Result<MediaStream, String> {
        self.open_js(request)
            .await
            .map_err(|err| js_value_to_string(&err))
    }

    async fn video_inputs(&self) -> Result<Vec<VideoInput>, String> {
        self.video_inputs_js()
            .await
            .map_err(|err| js_value_to_string(&err))
    }
}

impl StreamHandle for MediaStream {
    fn stop(&self) {
        for track in self.get_tracks().iter() {
            match track.dyn_into::<MediaStreamTrack>() {
                Ok(track) => track.stop(),
                Err(err) => console::warn(&format!(
                    "failed to stop old track: {}",
                    js_value_to_string(&err)
                )),
            }
        }
    }
}

/// Points the video element at `stream` and starts playback. Some browsers
/// need the explicit `play()`; a rejected play is ignored.
pub async fn show_stream(video: &HtmlVideoElement, stream: Option<&MediaStream>) {
    video.set_src_object(stream);
    if stream.is_none() {
        return;
    }
    if let Ok(promise) = video.play() {
        let _ = JsFuture::from(promise).await;
    }
}
