pub trait Countdown {
    /// Arm the one-shot countdown so the next expiry happens `ticks` timer ticks from now.
    fn arm(&mut self, ticks: u32);
}

pub trait Button {
    fn is_pressed(&mut self) -> bool;
}
