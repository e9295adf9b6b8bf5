// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

fn main() {
    println!("cargo:rerun-if-changed=winres/icon_main.ico");

    if std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }

    let icon = std::path::Path::new("winres/icon_main.ico");
    if !icon.exists() {
        println!("cargo:warning=winres/icon_main.ico not found, building without an icon");
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set_icon("winres/icon_main.ico");
    res.set("FileDescription", "Fuser Launcher");
    if let Err(e) = res.compile() {
        // A missing resource compiler should not fail the build
        println!("cargo:warning=Error compiling Windows resources: {}", e);
    }
}
