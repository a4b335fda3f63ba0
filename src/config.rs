/// Floor for the reduce-partition count: small runs still fan out across a
/// few part files. Requests below this are bumped up, never rejected.
pub const MIN_REDUCE_TASKS: usize = 4;

/// Run options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct JobOptions {
    pub reduce_tasks: usize,        // number of reduce partitions (floored at MIN_REDUCE_TASKS)
    pub map_concurrency: usize,     // limit number of input splits mapped concurrently
    pub parallelism: Option<usize>, // Some(N) to set rayon threads, None to use default
    pub progress: bool,             // show progress bars

    // IO tuning
    pub read_buffer_bytes: usize,   // BufReader capacity
    pub write_buffer_bytes: usize,  // BufWriter capacity
}

impl Default for JobOptions {
    fn default() -> Self {
        // Defaults chosen to be safe but noticeably faster than std defaults.
        // Adjust at runtime via io_* builder methods.
        let default_read = 256 * 1024;
        let default_write = 256 * 1024;

        Self {
            reduce_tasks: MIN_REDUCE_TASKS,
            map_concurrency: 4, // splits are plain text; map output is what costs memory
            parallelism: None,
            progress: true,

            read_buffer_bytes: default_read,
            write_buffer_bytes: default_write,
        }
    }
}

impl JobOptions {
    pub fn with_reduce_tasks(mut self, n: usize) -> Self {
        self.reduce_tasks = n.max(MIN_REDUCE_TASKS);
        self
    }
    pub fn with_map_concurrency(mut self, n: usize) -> Self {
        self.map_concurrency = n.max(1);
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    // IO buffers tuning
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }
}
