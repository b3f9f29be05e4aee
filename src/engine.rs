use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::command::{CommandReceiver, ModuleCommand};
use crate::gamma::{DEFAULT_GAMMA, GammaTable};
use crate::module::Module;
use crate::pattern::ModuleConfig;
use crate::self_test::{SelfTest, SelfTestConfig, Sweep};
use crate::{Clock, OutputDriver};

/// Duty written to every output at construction.
pub const DEFAULT_INITIAL_DUTY: u8 = 64;

/// Configuration for the stack light engine.
#[derive(Debug, Clone, Copy)]
pub struct StackLightConfig {
    /// Gamma exponent for brightness correction.
    pub gamma: f32,
    /// Duty written to the outputs before the first update.
    pub initial_duty: u8,
    /// Power-on self-test settings.
    pub self_test: SelfTestConfig,
}

impl Default for StackLightConfig {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            initial_duty: DEFAULT_INITIAL_DUTY,
            self_test: SelfTestConfig::default(),
        }
    }
}

/// Stack light engine.
///
/// Owns `N` modules and renders their patterns to the output driver.
/// Every pattern is derived from the clock, so the rate at which
/// [`update`](Self::update) is called does not change pattern speed.
///
/// Setters addressing a module index `>= N` are ignored.
pub struct StackLight<O: OutputDriver, C: Clock, const N: usize> {
    // External dependencies
    driver: O,
    clock: C,

    // Internal state
    modules: [Module<O::Channel>; N],
    gamma: GammaTable,
    sweep: Sweep,
    self_test: SelfTest,
    now: Instant,
}

impl<O: OutputDriver, C: Clock, const N: usize> StackLight<O, C, N> {
    /// Create a new engine driving one module per channel.
    ///
    /// Configures every channel as an output and writes the initial duty.
    /// All modules start as solid and off.
    pub fn new(
        mut driver: O,
        clock: C,
        channels: [O::Channel; N],
        config: &StackLightConfig,
    ) -> Self {
        let modules = channels.map(Module::new);
        for module in &modules {
            driver.configure(module.channel());
            driver.write(module.channel(), config.initial_duty);
        }

        let self_test = if config.self_test.enabled && N > 0 {
            SelfTest::NotStarted
        } else {
            SelfTest::Finished
        };

        Self {
            driver,
            clock,
            modules,
            gamma: GammaTable::new(config.gamma),
            sweep: Sweep::new(config.self_test.step, N),
            self_test,
            now: Instant::from_millis(0),
        }
    }

    /// Render one tick at the current clock time.
    pub fn update(&mut self) {
        let now = self.clock.now();
        self.update_at(now);
    }

    /// Render one tick at `now`.
    ///
    /// Runs the self-test sweep until it is over, then writes every module's
    /// pattern. A timestamp older than the previous one does not move time back.
    pub fn update_at(&mut self, now: Instant) {
        self.now = self.now.max(now);

        // The sweep starts on the first update
        if self.self_test == SelfTest::NotStarted {
            #[cfg(feature = "esp32-log")]
            println!("[StackLight.update] starting self-test at {:?}", self.now);
            self.self_test = SelfTest::Running { start: self.now };
        }

        if let SelfTest::Running { start } = self.self_test {
            self.render_self_test(start);
        } else {
            self.render_patterns();
        }
    }

    fn render_self_test(&mut self, start: Instant) {
        let elapsed = self
            .now
            .checked_duration_since(start)
            .unwrap_or(Duration::from_millis(0));

        let Some(frame) = self.sweep.frame(elapsed) else {
            #[cfg(feature = "esp32-log")]
            println!("[StackLight.update] self-test finished after {:?}", elapsed);
            self.self_test = SelfTest::Finished;
            return;
        };

        for (index, module) in self.modules.iter().enumerate() {
            self.driver
                .write(module.channel(), self.gamma.correct(frame.level(index)));
        }
    }

    fn render_patterns(&mut self) {
        for module in &self.modules {
            self.driver
                .write(module.channel(), self.gamma.correct(module.level(self.now)));
        }
    }

    /// Replace the full configuration of a module.
    pub fn set_pattern(&mut self, index: usize, config: ModuleConfig) {
        if let Some(module) = self.module_mut(index) {
            module.configure(&config);
        }
    }

    /// Replace the full configuration of a module using a raw pattern id.
    ///
    /// Unknown ids are stored as is and render as off.
    pub fn set_pattern_raw(
        &mut self,
        index: usize,
        pattern: u8,
        brightness: u8,
        period: Duration,
        param: u8,
    ) {
        if let Some(module) = self.module_mut(index) {
            module.set_raw(pattern, brightness, period, param);
        }
    }

    /// Replace only the brightness of a module.
    pub fn set_brightness(&mut self, index: usize, brightness: u8) {
        if let Some(module) = self.module_mut(index) {
            module.set_brightness(brightness);
        }
    }

    /// Replace only the period of a module.
    pub fn set_period(&mut self, index: usize, period: Duration) {
        if let Some(module) = self.module_mut(index) {
            module.set_period(period);
        }
    }

    /// Replace only the reserved parameter of a module.
    ///
    /// No pattern reads it yet.
    pub fn set_param(&mut self, index: usize, param: u8) {
        if let Some(module) = self.module_mut(index) {
            module.set_param(param);
        }
    }

    /// Run the setter described by a command.
    pub fn apply(&mut self, command: ModuleCommand) {
        match command {
            ModuleCommand::SetPattern { index, config } => self.set_pattern(index, config),
            ModuleCommand::SetBrightness { index, brightness } => {
                self.set_brightness(index, brightness);
            }
            ModuleCommand::SetPeriod { index, period } => self.set_period(index, period),
            ModuleCommand::SetParam { index, param } => self.set_param(index, param),
        }
    }

    /// Apply every queued command (non-blocking).
    ///
    /// Returns the number of commands applied.
    pub fn apply_pending<const SIZE: usize>(
        &mut self,
        commands: &CommandReceiver<'_, SIZE>,
    ) -> usize {
        let mut applied = 0;
        while let Ok(command) = commands.try_receive() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    fn module_mut(&mut self, index: usize) -> Option<&mut Module<O::Channel>> {
        #[cfg(feature = "esp32-log")]
        if index >= N {
            println!("[StackLight] ignoring module index {} (count {})", index, N);
        }
        self.modules.get_mut(index)
    }

    /// Number of modules.
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the engine drives no modules.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get a module by index.
    ///
    /// Returns None if the index is out of range.
    pub fn module(&self, index: usize) -> Option<&Module<O::Channel>> {
        self.modules.get(index)
    }

    /// Get all modules in channel order.
    pub const fn modules(&self) -> &[Module<O::Channel>; N] {
        &self.modules
    }

    /// Get the self-test progress.
    pub const fn self_test(&self) -> SelfTest {
        self.self_test
    }

    /// Time of the last update.
    pub const fn now(&self) -> Instant {
        self.now
    }

    /// Get the gamma table used for output correction.
    pub const fn gamma(&self) -> &GammaTable {
        &self.gamma
    }

    /// Get a reference to the output driver.
    pub const fn driver(&self) -> &O {
        &self.driver
    }

    /// Get a mutable reference to the output driver.
    pub const fn driver_mut(&mut self) -> &mut O {
        &mut self.driver
    }
}
