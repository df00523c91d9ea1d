//! GStreamer decode backend
//!
//! Consumes the RTSP stream over TCP (reliable transport, so packet loss
//! never corrupts frames) and decodes H.264 to BGRA at the display
//! geometry. The appsink keeps at most one buffer and drops the rest,
//! matching the latest-frame policy of the rest of the pipeline.

use bytes::Bytes;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;

use crate::feeds::FeedConfig;
use crate::render::{PixelFormat, VideoFrame};

use super::backend::{BackendFactory, BackendStatus, DecodeBackend, StreamError};

/// H.264 decoder element selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    /// Software decode (`avdec_h264`)
    Software,
    /// V4L2 stateful hardware decode (`v4l2h264dec`), Pi-class boards
    Hardware,
}

impl DecoderKind {
    fn element(self) -> &'static str {
        match self {
            DecoderKind::Software => "avdec_h264",
            DecoderKind::Hardware => "v4l2h264dec",
        }
    }
}

/// Factory producing [`GstBackend`]s
pub struct GstBackendFactory {
    width: u32,
    height: u32,
    decoder: DecoderKind,
}

impl GstBackendFactory {
    /// Initialize GStreamer and create the factory
    pub fn new(width: u32, height: u32, decoder: DecoderKind) -> Result<Self, StreamError> {
        gstreamer::init().map_err(|e| StreamError::Connect(e.to_string()))?;
        Ok(Self {
            width,
            height,
            decoder,
        })
    }
}

impl BackendFactory for GstBackendFactory {
    type Backend = GstBackend;

    fn create(&self, feed: &FeedConfig) -> GstBackend {
        GstBackend {
            url: feed.url.clone(),
            width: self.width,
            height: self.height,
            decoder: self.decoder,
            pipeline: None,
            next_seq: 0,
        }
    }
}

/// One RTSP/H.264 decode pipeline
pub struct GstBackend {
    url: String,
    width: u32,
    height: u32,
    decoder: DecoderKind,
    pipeline: Option<(gstreamer::Pipeline, AppSink)>,
    next_seq: u64,
}

impl GstBackend {
    fn launch(&self) -> Result<(gstreamer::Pipeline, AppSink), StreamError> {
        let description = format!(
            "rtspsrc location={} latency=0 protocols=tcp ! rtph264depay ! h264parse ! {} \
             ! videoconvert ! video/x-raw,format=BGRA,width={},height={} \
             ! appsink name=sink sync=false drop=true max-buffers=1",
            self.url,
            self.decoder.element(),
            self.width,
            self.height
        );

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| StreamError::Connect(e.to_string()))?
            .downcast::<gstreamer::Pipeline>()
            .map_err(|_| StreamError::Connect("not a pipeline".into()))?;

        let sink = pipeline
            .by_name("sink")
            .ok_or_else(|| StreamError::Connect("appsink missing".into()))?
            .downcast::<AppSink>()
            .map_err(|_| StreamError::Connect("sink is not an appsink".into()))?;

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        Ok((pipeline, sink))
    }

    /// Surface pipeline errors reported asynchronously on the bus
    fn check_bus(pipeline: &gstreamer::Pipeline) -> Result<(), StreamError> {
        let Some(bus) = pipeline.bus() else {
            return Ok(());
        };
        if let Some(msg) =
            bus.pop_filtered(&[gstreamer::MessageType::Error, gstreamer::MessageType::Eos])
        {
            return Err(match msg.view() {
                gstreamer::MessageView::Error(e) => StreamError::Decode(e.error().to_string()),
                _ => StreamError::Disconnected,
            });
        }
        Ok(())
    }
}

impl DecodeBackend for GstBackend {
    fn start(&mut self) -> Result<(), StreamError> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        self.pipeline = Some(self.launch()?);
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<VideoFrame>, StreamError> {
        let Some((pipeline, sink)) = self.pipeline.as_ref() else {
            return Ok(None);
        };

        Self::check_bus(pipeline)?;

        let Some(sample) = sink.try_pull_sample(gstreamer::ClockTime::ZERO) else {
            return Ok(None);
        };
        let buffer = sample
            .buffer()
            .ok_or_else(|| StreamError::Decode("sample without buffer".into()))?;
        let map = buffer
            .map_readable()
            .map_err(|e| StreamError::Decode(e.to_string()))?;

        let data = Bytes::copy_from_slice(map.as_slice());
        self.next_seq += 1;
        Ok(VideoFrame::new(
            data,
            self.width,
            self.height,
            PixelFormat::Bgra8888,
            self.next_seq,
        ))
    }

    fn stop(&mut self) {
        if let Some((pipeline, _)) = self.pipeline.take() {
            let _ = pipeline.set_state(gstreamer::State::Null);
        }
    }

    fn status(&self) -> BackendStatus {
        if self.pipeline.is_some() {
            BackendStatus::Running
        } else {
            BackendStatus::Stopped
        }
    }
}

impl Drop for GstBackend {
    fn drop(&mut self) {
        self.stop();
    }
}
