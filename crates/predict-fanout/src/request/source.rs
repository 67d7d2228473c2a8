use super::predict::LabeledRequest;

/// Supplies the payload of each request in a run.
///
/// `index` runs from `0` to `num_requests - 1` in submission order.
pub trait SampleSource: Send + Sync {
    fn sample(&self, index: usize) -> LabeledRequest;
}

impl<F> SampleSource for F
where F: Fn(usize) -> LabeledRequest + Send + Sync
{
    fn sample(&self, index: usize) -> LabeledRequest {
        self(index)
    }
}

/// Sends the same request every time.
#[derive(Debug, Clone)]
pub struct FixedSample {
    sample: LabeledRequest,
}

impl FixedSample {
    pub fn new(sample: LabeledRequest) -> Self {
        Self { sample }
    }
}

impl SampleSource for FixedSample {
    fn sample(&self, _index: usize) -> LabeledRequest {
        self.sample.clone()
    }
}

/// Cycles through a list of requests, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct CyclicSamples {
    samples: Vec<LabeledRequest>,
}

impl CyclicSamples {
    /// Returns `None` for an empty list.
    pub fn new(samples: Vec<LabeledRequest>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self { samples })
        }
    }
}

impl SampleSource for CyclicSamples {
    fn sample(&self, index: usize) -> LabeledRequest {
        self.samples[index % self.samples.len()].clone()
    }
}
