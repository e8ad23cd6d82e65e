use clap::{App, Arg, SubCommand};
use icoformat::{
    BmpDepth, EncodeOptions, IcoWriter, IconDir, IconImage, ResourceType,
};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

//===========================================================================//

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = App::new("icotool")
        .version("0.1")
        .about("Manipulates ICO and CUR files")
        .subcommand(
            SubCommand::with_name("create")
                .about("Creates an ICO or CUR file from PNG files")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(
                    Arg::with_name("cursor")
                        .short("c")
                        .long("cursor")
                        .help("Writes a cursor instead of an icon"),
                )
                .arg(
                    Arg::with_name("compact")
                        .long("compact")
                        .help("Stores every image as PNG"),
                )
                .arg(
                    Arg::with_name("depth")
                        .takes_value(true)
                        .value_name("BPP")
                        .short("d")
                        .long("depth")
                        .help("Preferred bits-per-pixel for raw images"),
                )
                .arg(Arg::with_name("image").multiple(true)),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("Extracts one image from an ICO or CUR file")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(Arg::with_name("ico").required(true))
                .arg(Arg::with_name("index").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists images in an ICO or CUR file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();
    if let Some(submatches) = matches.subcommand_matches("create") {
        let restype = if submatches.is_present("cursor") {
            ResourceType::Cursor
        } else {
            ResourceType::Icon
        };
        let out_path = if let Some(path) = submatches.value_of("output") {
            PathBuf::from(path)
        } else {
            let extension = restype.extension();
            let mut path = PathBuf::from(format!("out.{}", extension));
            let mut index: i32 = 0;
            while path.exists() {
                index += 1;
                path = PathBuf::from(format!("out{}.{}", index, extension));
            }
            path
        };
        let depth = match submatches.value_of("depth") {
            Some(bits) => match BmpDepth::from_bits_per_pixel(bits.parse()?) {
                Some(depth) => Some(depth),
                None => return Err(format!("bad depth: {}", bits).into()),
            },
            None => None,
        };
        let options =
            EncodeOptions::new().compact(submatches.is_present("compact"));
        let mut writer = IcoWriter::with_options(restype, options);
        if let Some(paths) = submatches.values_of("image") {
            for path in paths {
                println!("Adding {:?}", path);
                let file = fs::File::open(path)?;
                let image = IconImage::read_png(file)?;
                writer.add_image_with_depth(&image, depth)?;
            }
        }
        let out_file = fs::File::create(out_path)?;
        writer.finalize(out_file)?;
    } else if let Some(submatches) = matches.subcommand_matches("extract") {
        let path = submatches.value_of("ico").unwrap_or_default();
        let mut file = fs::File::open(path)?;
        let icondir = IconDir::read(&mut file)?;
        let index = submatches.value_of("index").unwrap_or_default();
        let index = index.parse::<usize>()?;
        let entry = match icondir.entries().get(index) {
            Some(entry) => entry,
            None => {
                let count = icondir.len();
                return Err(format!("{} has {} images", path, count).into());
            }
        };
        let image = entry.decode(&mut file)?;
        let out_path = if let Some(path) = submatches.value_of("output") {
            PathBuf::from(path)
        } else {
            PathBuf::from(format!("{}.{}.png", path, index))
        };
        let out_file = fs::File::create(out_path)?;
        image.write_png(out_file)?;
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        let path = submatches.value_of("ico").unwrap_or_default();
        let mut file = fs::File::open(path)?;
        let icondir = IconDir::read(&mut file)?;
        println!("Resource type: {:?}", icondir.resource_type());
        for entry in icondir.entries().iter() {
            let kind = if entry.is_png(&mut file)? { "PNG" } else { "BMP" };
            let suffix = if let Some((x, y)) = entry.cursor_hotspot() {
                format!("hotspot at ({}, {})", x, y)
            } else {
                format!("{} bpp", entry.bits_per_pixel())
            };
            println!(
                "{:5}: {}x{} {}, {}",
                entry.index(),
                entry.width(),
                entry.height(),
                kind,
                suffix
            );
        }
    }
    Ok(())
}

//===========================================================================//
