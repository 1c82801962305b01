use crate::{
    model::{Class, Conversion, Parent, Property, Unit},
    options::CodegenOptions,
};

const INDENT: &str = "    ";

/// Line-oriented text buffer that tracks brace nesting.
struct CodeWriter {
    out:    String,
    indent: usize,
}

impl CodeWriter {
    fn new() -> Self {
        CodeWriter { out: String::new(), indent: 0 }
    }

    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(header);
        self.line("{");
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn summary(w: &mut CodeWriter, text: Option<&str>) {
    if let Some(text) = text {
        w.line("/// <summary>");
        w.line(&format!("/// {}", escape_xml(text)));
        w.line("/// </summary>");
    }
}

fn parent_name(parent: &Parent, options: &CodegenOptions) -> String {
    match parent {
        Parent::Root => options.root_class.clone(),
        Parent::Class(name) => name.clone(),
        Parent::Function(result) => format!("{}<{}>", options.function_class, result),
    }
}

fn converter(conversion: Conversion, options: &CodegenOptions) -> String {
    match conversion {
        Conversion::Default => options.converter.clone(),
        Conversion::StringInt64 => format!("{}.Int64", options.converter),
    }
}

fn render_meta(w: &mut CodeWriter, discriminator: &str) {
    summary(w, Some("Data type for serialization"));
    w.line("[JsonProperty(\"@type\")]");
    w.line(&format!(
        "public override string DataType {{ get; set; }} = \"{}\";",
        discriminator
    ));
    w.line("");
    summary(w, Some("Extra data attached to the message"));
    w.line("[JsonProperty(\"@extra\")]");
    w.line("public override string Extra { get; set; }");
}

fn render_property(w: &mut CodeWriter, property: &Property, options: &CodegenOptions) {
    summary(w, property.description.as_deref());
    w.line(&format!("[JsonConverter(typeof({}))]", converter(property.conversion, options)));
    w.line(&format!("[JsonProperty(\"{}\")]", property.wire_name));
    w.line(&format!("public {} {} {{ get; set; }}", property.type_, property.name));
}

fn render_class(w: &mut CodeWriter, class: &Class, options: &CodegenOptions, top_level: bool) {
    summary(w, class.description.as_deref());
    let modifier = if top_level { "partial class" } else { "class" };
    w.open(&format!(
        "public {} {} : {}",
        modifier,
        class.name,
        parent_name(&class.parent, options)
    ));

    let mut first = true;
    let mut separate = |w: &mut CodeWriter| {
        if !first {
            w.line("");
        }
        first = false;
    };

    if let Some(discriminator) = &class.discriminator {
        separate(w);
        render_meta(w, discriminator);
    }
    for property in &class.properties {
        separate(w);
        render_property(w, property, options);
    }
    for nested in &class.nested {
        separate(w);
        render_class(w, nested, options, false);
    }

    w.close();
}

/// Renders one unit as a complete source file.
pub fn render_unit(unit: &Unit, options: &CodegenOptions) -> String {
    let mut w = CodeWriter::new();

    w.line("// <auto-generated>");
    w.line("// Generated by tlgen. Changes to this file will be lost.");
    w.line("// </auto-generated>");
    w.line("using System;");
    w.line("using Newtonsoft.Json;");
    w.line("");
    w.open(&format!("namespace {}", options.namespace));
    w.open(&format!("public static partial class {}", options.container));
    render_class(&mut w, &unit.class, options, true);
    w.close();
    w.close();

    w.finish()
}

/// Relative output path of a unit, e.g. `Objects/PhotoMessage.cs`.
pub fn unit_path(unit: &Unit, options: &CodegenOptions) -> std::path::PathBuf {
    let dir = match unit.kind {
        crate::model::UnitKind::Object => &options.objects_dir,
        crate::model::UnitKind::Function => &options.functions_dir,
    };
    std::path::Path::new(dir).join(format!("{}.{}", unit.file_stem, options.extension))
}
