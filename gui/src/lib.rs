pub mod core {
    pub mod gui;
    pub mod scene;
}

pub mod interfaces {
    pub mod arcadesim_interface;
}


#[cfg(test)]
mod key_tests {
    use crate::core::gui::map_keys;
    use arcadesim::core::input::InputState;
    use eframe::egui::Key;

    #[test]
    fn test_map_keys() {
        let controls = map_keys(|key| key == Key::A || key == Key::Space, false);
        assert_eq!(
            controls,
            InputState {
                left: true,
                right: false,
                accel: true,
                nitro: false,
            }
        );
        assert_eq!(controls.steer(), 1.0);

        let controls = map_keys(|key| key == Key::ArrowRight, true);
        assert!(controls.right && controls.nitro && !controls.accel);

        assert_eq!(map_keys(|_| false, false), InputState::default());
    }
}
