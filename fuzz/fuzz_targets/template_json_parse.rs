#![no_main]

use bulkcrop::template::Template;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(template) = Template::from_json_str(text, "fuzz") {
        assert!(template.width() > 0);
        assert!(template.height() > 0);
        let json = template.to_json_string().expect("render normalized template");
        let reloaded = Template::from_json_str(&json, "fuzz").expect("reload template");
        assert_eq!(template, reloaded);
    }
});
