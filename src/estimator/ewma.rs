/// Exponentially weighted moving average with a companion variance.
#[derive(Debug)]
pub(super) struct Ewma {
    initialized: bool,
    alpha: f64,
    average: f64,
    variance: f64,
}

impl Ewma {
    pub fn new(alpha: f64) -> Ewma {
        Ewma {
            initialized: false,
            alpha,
            average: 0.0,
            variance: 0.0,
        }
    }

    pub fn update(&mut self, sample: f64) {
        if !self.initialized {
            self.initialized = true;
            self.average = sample;
            return;
        }
        let delta = sample - self.average;
        self.average += self.alpha * delta;
        self.variance = (1.0 - self.alpha) * (self.variance + self.alpha * delta * delta);
    }

    pub fn reset(&mut self) {
        self.initialized = false;
        self.average = 0.0;
        self.variance = 0.0;
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}
