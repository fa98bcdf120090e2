/// Process-wide run-control flags. Lives inside [`super::SharedContext`] and is
/// only reachable through a held [`super::SyncScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunControl {
    quit: bool,
    paused: bool,
    single_step: bool,
}

impl RunControl {
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_single_step(&mut self, enabled: bool) {
        self.single_step = enabled;
    }

    pub fn toggle_single_step(&mut self) -> bool {
        self.single_step = !self.single_step;
        self.single_step
    }

    pub fn is_single_step_on(&self) -> bool {
        self.single_step
    }
}
