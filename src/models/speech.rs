use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Filename used for the audio part when none is given.
pub const DEFAULT_AUDIO_FILE_NAME: &str = "audio";

/// One audio chunk for `POST /api/speech/upload`.
///
/// Chunks with the same `session_id` belong to one recording, ordered by
/// `chunk_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudioUpload {
    pub pro_id: String,
    pub session_id: String,
    /// 0-based position within the session
    pub chunk_index: i64,
    pub audio: Bytes,
    /// Multipart filename; blank means [`DEFAULT_AUDIO_FILE_NAME`]
    pub file_name: Option<String>,
    /// Sample rate in Hz; 0 lets the server detect it
    pub sample_rate: u32,
}

impl SpeechAudioUpload {
    pub fn new(
        pro_id: impl Into<String>,
        session_id: impl Into<String>,
        chunk_index: i64,
        audio: impl Into<Bytes>,
    ) -> Self {
        Self {
            pro_id: pro_id.into(),
            session_id: session_id.into(),
            chunk_index,
            audio: audio.into(),
            file_name: None,
            sample_rate: 0,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// Reply to an audio chunk upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechUploadResponse {
    pub ok: bool,
    /// The same chunk was already stored
    pub existed: bool,
    pub id: Option<i64>,
    pub pro_id: String,
    pub session_id: String,
    pub chunk_index: i64,
    /// Effective sample rate, when the server could determine it
    pub sample_rate: Option<u32>,
    pub stored_path: String,
    /// Normalized 16 kHz mono copy used for recognition
    pub wav16k_mono_path: Option<String>,
    /// Empty until recognition has run
    pub transcript: String,
}

/// Text attached to a speech chunk via `POST /api/speech/text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechTextUpload {
    pub pro_id: String,
    pub session_id: String,
    pub chunk_index: i64,
    pub text: String,
}

impl SpeechTextUpload {
    pub fn new(
        pro_id: impl Into<String>,
        session_id: impl Into<String>,
        chunk_index: i64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            pro_id: pro_id.into(),
            session_id: session_id.into(),
            chunk_index,
            text: text.into(),
        }
    }
}

/// Recognition status of one stored chunk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechStatusResponse {
    /// The lookup itself succeeded
    pub ok: bool,
    /// A chunk matched the id or key
    pub found: bool,
    pub id: Option<i64>,
    pub pro_id: String,
    pub session_id: String,
    pub chunk_index: i64,
    /// "pending", "ok" or "error"
    pub asr_status: String,
    pub asr_error: Option<String>,
    pub transcript: String,
    pub duration_sec: Option<f64>,
    pub audio_sha256: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_decodes() {
        let response: SpeechUploadResponse = serde_json::from_str(
            r#"{"ok":true,"existed":false,"id":12,"proId":"p1","sessionId":"s1",
                "chunkIndex":2,"sampleRate":null,"storedPath":"/data/s1/2.webm",
                "wav16kMonoPath":"/data/s1/2.wav","transcript":""}"#,
        )
        .unwrap();

        assert!(response.ok);
        assert_eq!(response.id, Some(12));
        assert_eq!(response.chunk_index, 2);
        assert_eq!(response.sample_rate, None);
        assert_eq!(response.wav16k_mono_path.as_deref(), Some("/data/s1/2.wav"));
    }

    #[test]
    fn test_status_response_decodes() {
        let status: SpeechStatusResponse = serde_json::from_str(
            r#"{"ok":true,"found":true,"id":5,"asrStatus":"error",
                "asrError":"decoder failed","durationSec":1.5,"audioSha256":"ab12"}"#,
        )
        .unwrap();

        assert!(status.found);
        assert_eq!(status.asr_status, "error");
        assert_eq!(status.asr_error.as_deref(), Some("decoder failed"));
        assert_eq!(status.duration_sec, Some(1.5));
        assert_eq!(status.audio_sha256.as_deref(), Some("ab12"));
    }

    #[test]
    fn test_text_upload_shape() {
        let body =
            serde_json::to_value(SpeechTextUpload::new("p1", "s1", 0, "hello there")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "proId": "p1",
                "sessionId": "s1",
                "chunkIndex": 0,
                "text": "hello there"
            })
        );
    }
}
