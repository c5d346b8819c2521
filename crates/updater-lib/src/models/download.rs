use serde::{Deserialize, Serialize};

/// Transfer state of one file, written by the downloader and read by the UI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadInfo {
    file_name: String,
    bytes_downloaded: f64,
    download_speed: f64,
    bytes_per_second: f64,
    eta: f64,
    downloading: bool,
    file_size: u64,
}

impl DownloadInfo {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes_downloaded(&self) -> f64 {
        self.bytes_downloaded
    }

    pub fn set_bytes_downloaded(&mut self, bytes: u64) {
        self.bytes_downloaded = bytes as f64;
    }

    pub fn download_speed(&self) -> f64 {
        self.download_speed
    }

    pub fn set_download_speed(&mut self, speed: f64) {
        self.download_speed = speed;
    }

    pub fn bytes_per_second(&self) -> f64 {
        self.bytes_per_second
    }

    pub fn set_bytes_per_second(&mut self, bps: f64) {
        self.bytes_per_second = bps;
    }

    /// Estimated seconds remaining
    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn set_eta(&mut self, eta: f64) {
        self.eta = eta;
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn set_downloading(&mut self, downloading: bool) {
        self.downloading = downloading;
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn set_file_size(&mut self, size: u64) {
        self.file_size = size;
    }

    /// Completion in percent, 0 while the size is unknown
    pub fn progress_percent(&self) -> f64 {
        if self.file_size == 0 {
            return 0.0;
        }
        (self.bytes_downloaded / self.file_size as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let mut info = DownloadInfo::new("sodium.jar");
        assert_eq!(info.progress_percent(), 0.0);

        info.set_file_size(200);
        info.set_bytes_downloaded(50);
        assert_eq!(info.progress_percent(), 25.0);

        // Servers occasionally send more than they announced
        info.set_bytes_downloaded(400);
        assert_eq!(info.progress_percent(), 100.0);
    }

    #[test]
    fn test_new_starts_idle() {
        let info = DownloadInfo::new("lithium.jar");
        assert_eq!(info.file_name(), "lithium.jar");
        assert!(!info.is_downloading());
        assert_eq!(info.bytes_downloaded(), 0.0);
    }
}
