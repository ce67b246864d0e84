mod cycle;

pub use cycle::PollCycle;
