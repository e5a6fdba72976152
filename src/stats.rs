/// Counters accumulated over one extraction run.
///
/// The pipeline is single-threaded, so plain integers suffice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub records_read: u64,
    pub articles_written: u64,
    pub articles_failed: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl RunStats {
    pub fn record_read(&mut self, bytes: usize) {
        self.records_read += 1;
        self.bytes_in += bytes as u64;
    }

    pub fn article_written(&mut self, bytes: usize) {
        self.articles_written += 1;
        self.bytes_out += bytes as u64;
    }

    pub fn article_failed(&mut self) {
        self.articles_failed += 1;
    }
}
