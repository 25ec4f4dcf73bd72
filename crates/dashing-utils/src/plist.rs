use dashing_config::Config;
use tera::Tera;

use crate::error::OutputError;

/// Bundle metadata read by docset viewers.
pub const INFO_PLIST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleIdentifier</key>
	<string>{{ package | escape_xml }}</string>
	<key>CFBundleName</key>
	<string>{{ name | escape_xml }}</string>
	<key>DocSetPlatformFamily</key>
	<string>{{ package | escape_xml }}</string>
	<key>isDashDocset</key>
	<true/>
	<key>DashDocSetFamily</key>
	<string>dashtoc3</string>
	<key>dashIndexFilePath</key>
	<string>{{ index | escape_xml }}</string>
	<key>isJavaScriptEnabled</key><{{ allow_js }}/>{% if external_url %}
	<key>DashDocSetFallbackURL</key>
	<string>{{ external_url | escape_xml }}</string>{% endif %}
</dict>
</plist>
"#;

/// Renders `Info.plist` for `config`.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_info_plist(config: &Config) -> Result<String, OutputError> {
  let mut tera = Tera::default();
  tera.add_raw_template("Info.plist", INFO_PLIST_TEMPLATE)?;

  let mut context = tera::Context::new();
  context.insert("package", &config.package);
  context.insert("name", &config.fancy_name());
  context.insert("index", &config.index);
  context.insert("allow_js", &config.allow_js);
  context.insert("external_url", &config.external_url);

  Ok(tera.render("Info.plist", &context)?)
}
