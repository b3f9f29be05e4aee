mod common;

mod tests {
    use std::cell::Cell;

    use embassy_time::{Duration, Instant};
    use stack_light::{
        Clock, EmbassyClock, FnClock, ModuleConfig, Pattern, SelfTest, SelfTestConfig, StackLight,
        StackLightConfig,
    };

    use crate::common::{RecordingDriver, gamma};

    const PINS: [u8; 3] = [1, 2, 3];

    fn config_without_test() -> StackLightConfig {
        StackLightConfig {
            self_test: SelfTestConfig {
                enabled: false,
                ..SelfTestConfig::default()
            },
            ..StackLightConfig::default()
        }
    }

    fn engine() -> StackLight<RecordingDriver, EmbassyClock, 3> {
        StackLight::new(
            RecordingDriver::default(),
            EmbassyClock,
            PINS,
            &config_without_test(),
        )
    }

    #[test]
    fn test_new_configures_outputs() {
        let engine = StackLight::new(
            RecordingDriver::default(),
            EmbassyClock,
            PINS,
            &StackLightConfig::default(),
        );
        assert_eq!(engine.driver().configured, vec![1, 2, 3]);
        assert_eq!(engine.driver().writes, vec![(1, 64), (2, 64), (3, 64)]);
        assert_eq!(engine.self_test(), SelfTest::NotStarted);
        assert_eq!(engine.len(), 3);

        for module in engine.modules() {
            assert_eq!(module.pattern(), Some(Pattern::Solid));
            assert_eq!(module.brightness(), 0);
            assert_eq!(module.period(), Duration::from_millis(0));
            assert_eq!(module.param(), 0);
        }
    }

    #[test]
    fn test_solid_ignores_time() {
        let mut engine = engine();
        engine.set_pattern(0, ModuleConfig::new(Pattern::Solid).with_brightness(200));
        for ms in [0, 17, 1000, 65_536, 5_000_000] {
            engine.update_at(Instant::from_millis(ms));
            assert_eq!(engine.driver().duty(1), Some(139));
            assert_eq!(engine.driver().duty(2), Some(0));
        }
    }

    #[test]
    fn test_flash_scenario() {
        let mut engine = engine();
        engine.set_pattern(
            1,
            ModuleConfig::new(Pattern::Flash)
                .with_brightness(200)
                .with_period(Duration::from_millis(1000)),
        );

        // Condensed half-period is 1000 / 16 = 62 steps
        for t in [0u64, 30, 61, 124, 150, 185] {
            engine.update_at(Instant::from_millis(t * 16));
            assert_eq!(engine.driver().duty(2), Some(gamma(200)), "t = {t}");
        }
        for t in [62u64, 100, 123, 186, 247] {
            engine.update_at(Instant::from_millis(t * 16));
            assert_eq!(engine.driver().duty(2), Some(gamma(0)), "t = {t}");
        }
    }

    #[test]
    fn test_pulse_applies_gamma() {
        let mut engine = engine();
        engine.set_pattern(
            2,
            ModuleConfig::new(Pattern::Pulse)
                .with_brightness(255)
                .with_period(Duration::from_millis(1600)),
        );

        engine.update_at(Instant::from_millis(0));
        assert_eq!(engine.driver().duty(3), Some(0));
        engine.update_at(Instant::from_millis(800));
        assert_eq!(engine.driver().duty(3), Some(gamma(127)));
        engine.update_at(Instant::from_millis(1600));
        assert_eq!(engine.driver().duty(3), Some(255));
        engine.update_at(Instant::from_millis(2400));
        assert_eq!(engine.driver().duty(3), Some(gamma(127)));
    }

    #[test]
    fn test_unknown_pattern_is_off() {
        let mut engine = engine();
        engine.set_pattern_raw(0, 9, 255, Duration::from_millis(1000), 0);
        assert_eq!(engine.module(0).map(|m| m.pattern()), Some(None));
        assert_eq!(engine.module(0).map(|m| m.brightness()), Some(255));

        engine.update_at(Instant::from_millis(100));
        assert_eq!(engine.driver().duty(1), Some(0));

        engine.set_pattern_raw(0, 0, 255, Duration::from_millis(1000), 0);
        engine.update_at(Instant::from_millis(200));
        assert_eq!(engine.driver().duty(1), Some(255));
    }

    #[test]
    fn test_partial_setters() {
        let mut engine = engine();
        engine.set_pattern(0, ModuleConfig::new(Pattern::Flash).with_brightness(10));
        engine.set_brightness(0, 20);
        engine.set_period(0, Duration::from_millis(500));
        engine.set_param(0, 7);

        let module = engine.module(0).copied();
        let module = module.as_ref();
        assert_eq!(module.map(|m| m.pattern()), Some(Some(Pattern::Flash)));
        assert_eq!(module.map(|m| m.brightness()), Some(20));
        assert_eq!(module.map(|m| m.period()), Some(Duration::from_millis(500)));
        assert_eq!(module.map(|m| m.param()), Some(7));
        assert_eq!(module.map(|m| m.channel()), Some(1));
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut engine = engine();
        engine.set_pattern(3, ModuleConfig::new(Pattern::Pulse).with_brightness(255));
        engine.set_pattern_raw(4, 1, 255, Duration::from_millis(100), 1);
        engine.set_brightness(3, 255);
        engine.set_period(usize::MAX, Duration::from_millis(100));
        engine.set_param(10, 1);

        assert!(engine.module(3).is_none());
        for module in engine.modules() {
            assert_eq!(module.pattern(), Some(Pattern::Solid));
            assert_eq!(module.brightness(), 0);
            assert_eq!(module.period(), Duration::from_millis(0));
            assert_eq!(module.param(), 0);
        }
    }

    #[test]
    fn test_param_does_not_change_output() {
        let mut engine = engine();
        let config = ModuleConfig::new(Pattern::Flash)
            .with_brightness(100)
            .with_period(Duration::from_millis(320));
        engine.set_pattern(0, config);
        engine.set_pattern(1, config.with_param(200));

        for ms in (0..2000).step_by(37) {
            engine.update_at(Instant::from_millis(ms));
            assert_eq!(engine.driver().duty(1), engine.driver().duty(2));
        }
    }

    #[test]
    fn test_time_never_moves_back() {
        let mut engine = engine();
        engine.update_at(Instant::from_millis(5000));
        engine.update_at(Instant::from_millis(1000));
        assert_eq!(engine.now(), Instant::from_millis(5000));
    }

    #[test]
    fn test_update_reads_clock() {
        let millis = Cell::new(0u64);
        let clock = FnClock(|| Instant::from_millis(millis.get()));
        let mut engine = StackLight::new(RecordingDriver::default(), clock, PINS, &config_without_test());
        engine.set_pattern(
            0,
            ModuleConfig::new(Pattern::Flash)
                .with_brightness(255)
                .with_period(Duration::from_millis(160)),
        );

        engine.update();
        assert_eq!(engine.driver().duty(1), Some(255));

        millis.set(160);
        engine.update();
        assert_eq!(engine.now(), Instant::from_millis(160));
        assert_eq!(engine.driver().duty(1), Some(0));
    }

    #[test]
    fn test_custom_gamma() {
        let config = StackLightConfig {
            gamma: 1.0,
            ..config_without_test()
        };
        let mut engine = StackLight::new(RecordingDriver::default(), EmbassyClock, PINS, &config);
        engine.set_brightness(0, 100);
        engine.update_at(Instant::from_millis(0));
        assert_eq!(engine.driver().duty(1), Some(100));
    }

    #[test]
    fn test_borrowed_clock() {
        let millis = Cell::new(0u64);
        let clock = FnClock(|| Instant::from_millis(millis.get()));
        let mut engine: StackLight<RecordingDriver, &FnClock<_>, 3> =
            StackLight::new(RecordingDriver::default(), &clock, PINS, &config_without_test());
        engine.set_brightness(2, 255);

        millis.set(3200);
        engine.update();
        assert_eq!(engine.now(), Instant::from_millis(3200));
        assert_eq!(engine.driver().duty(3), Some(255));
        assert_eq!(clock.now(), Instant::from_millis(3200));
    }

    #[test]
    fn test_borrowed_embassy_clock() {
        let clock = EmbassyClock;
        let mut engine: StackLight<RecordingDriver, &EmbassyClock, 1> =
            StackLight::new(RecordingDriver::default(), &clock, [7], &config_without_test());
        engine.set_brightness(0, 255);
        engine.update();
        assert_eq!(engine.driver().duty(7), Some(255));
    }
}
