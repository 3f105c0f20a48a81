use clap::{Parser, Subcommand};
use osw_reformatter::{
    app::{xml_document_ops, ConversionResponse, Osm2Osw, Osw2Osm},
    config::ReformatterConfiguration,
    model::ReformatterError,
};
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct ReformatterAppArguments {
    #[command(subcommand)]
    app: App,
}

#[derive(Subcommand)]
pub enum App {
    /// convert an OSM .pbf, .osm or .xml file into walkway network layers
    Osm2osw {
        #[arg(long, help = "path to .pbf, .osm or .xml file to convert")]
        source_file: String,
        #[arg(long, help = "output path for the layer files")]
        output_directory: String,
        #[arg(long, help = "prefix of the layer file names")]
        prefix: String,
        #[arg(long, help = "path to file with osw-reformatter parameters")]
        configuration_file: Option<String>,
    },
    /// convert a zipped walkway network bundle into an OSM XML file
    Osw2osm {
        #[arg(long, help = "path to .zip bundle of layer files")]
        zip_file: String,
        #[arg(long, help = "output path for the OSM XML file and extracted layers")]
        output_directory: String,
        #[arg(long, help = "prefix of the OSM XML file name")]
        prefix: String,
        #[arg(long, help = "path to file with osw-reformatter parameters")]
        configuration_file: Option<String>,
    },
    /// renumber an OSM XML file in place to sequential ids and add missing versions
    Remap {
        #[arg(long, help = "path to OSM XML file to rewrite")]
        xml_file: String,
        #[arg(long, help = "path to file with osw-reformatter parameters")]
        configuration_file: Option<String>,
    },
}

fn read_configuration(
    configuration_file: &Option<String>,
) -> Result<ReformatterConfiguration, ReformatterError> {
    match configuration_file {
        None => Ok(ReformatterConfiguration::default()),
        Some(f) => {
            log::info!("reading osw-reformatter configuration from {f}");
            ReformatterConfiguration::try_from(f)
        }
    }
}

pub fn run(app: &App) -> ConversionResponse {
    env_logger::init();
    match app {
        App::Osm2osw {
            source_file,
            output_directory,
            prefix,
            configuration_file,
        } => match read_configuration(configuration_file) {
            Ok(conf) => {
                Osm2Osw::new(source_file, Path::new(output_directory), prefix, conf).convert()
            }
            Err(e) => ConversionResponse::from_result(Err(e)),
        },
        App::Osw2osm {
            zip_file,
            output_directory,
            prefix,
            configuration_file,
        } => match read_configuration(configuration_file) {
            Ok(conf) => Osw2Osm::new(
                Path::new(zip_file),
                Path::new(output_directory),
                prefix,
                conf,
            )
            .convert(),
            Err(e) => ConversionResponse::from_result(Err(e)),
        },
        App::Remap {
            xml_file,
            configuration_file,
        } => {
            let result = read_configuration(configuration_file).and_then(|conf| {
                let path = Path::new(xml_file);
                xml_document_ops::remap_xml_file(path, &conf.generator)?;
                xml_document_ops::ensure_version_xml_file(path, &conf.generator)?;
                Ok(vec![xml_file.clone()])
            });
            ConversionResponse::from_result(result)
        }
    }
}

fn main() {
    let args = ReformatterAppArguments::parse();
    let response = run(&args.app);
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failure encoding response: {e}");
            std::process::exit(1);
        }
    }
    if !response.status {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use osw_reformatter::{
        app::{Osm2Osw, Osw2Osm},
        config::ReformatterConfiguration,
        model::osm::{graph::OsmGraph, xml::read_osm_xml},
    };
    use std::{collections::BTreeSet, io::Write, path::Path};
    use zip::write::SimpleFileOptions;

    const CAMPUS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="101" lat="47.6500" lon="-122.3000"/>
  <node id="102" lat="47.6501" lon="-122.3000"/>
  <node id="103" lat="47.6502" lon="-122.3000">
    <tag k="kerb" v="lowered"/><tag k="ext:survey" v="2021"/>
  </node>
  <node id="104" lat="47.6503" lon="-122.3000"/>
  <node id="105" lat="47.6503" lon="-122.3001"/>
  <node id="106" lat="47.6510" lon="-122.3010">
    <tag k="natural" v="tree"/><tag k="ext:height" v="4"/>
  </node>
  <way id="201">
    <nd ref="101"/><nd ref="102"/><nd ref="103"/><nd ref="104"/>
    <tag k="highway" v="footway"/><tag k="footway" v="sidewalk"/>
    <tag k="ext:detail" v="kept"/><tag k="ext:meta" v="{&quot;b&quot;:1,&quot;a&quot;:2}"/>
  </way>
  <way id="202">
    <nd ref="104"/><nd ref="105"/>
    <tag k="highway" v="footway"/><tag k="footway" v="crossing"/>
  </way>
</osm>"#;

    fn config() -> ReformatterConfiguration {
        ReformatterConfiguration {
            parallelize: false,
            ..Default::default()
        }
    }

    fn zip_files(zip_path: &Path, files: &[String]) {
        let file = std::fs::File::create(zip_path).expect("create zip");
        let mut zip = zip::ZipWriter::new(file);
        for f in files {
            let path = Path::new(f);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .expect("file name");
            zip.start_file(format!("bundle/{name}"), SimpleFileOptions::default())
                .expect("start entry");
            zip.write_all(&std::fs::read(path).expect("read layer"))
                .expect("write entry");
        }
        zip.finish().expect("finish zip");
    }

    fn extension_tags(graph: &OsmGraph) -> BTreeSet<(String, String)> {
        let nodes = graph.nodes().flat_map(|n| n.tags.iter());
        let ways = graph.ways().flat_map(|w| w.tags.iter());
        nodes
            .chain(ways)
            .filter(|(k, _)| k.starts_with("ext:"))
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    fn round_trip(dir: &Path) -> (OsmGraph, OsmGraph) {
        let source = dir.join("campus.osm");
        std::fs::write(&source, CAMPUS).expect("write fixture");
        let forward = Osm2Osw::new(&source.to_string_lossy(), &dir.join("osw"), "rt", config())
            .convert();
        assert!(forward.status, "{:?}", forward.error);
        let files = forward.generated_files.expect("layer files");

        let zip_path = dir.join("rt.zip");
        zip_files(&zip_path, &files);
        let reverse = Osw2Osm::new(&zip_path, &dir.join("osm"), "rt", config()).convert();
        assert!(reverse.status, "{:?}", reverse.error);
        let output = reverse
            .generated_files
            .and_then(|f| f.into_iter().next())
            .expect("xml output");

        let original = read_osm_xml(&source).expect("reads source");
        let restored = read_osm_xml(Path::new(&output)).expect("reads output");
        (original, restored)
    }

    #[test]
    fn test_extension_tags_survive_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (original, restored) = round_trip(dir.path());
        let expected = extension_tags(&original);
        assert_eq!(expected.len(), 4);
        assert!(expected.contains(&(String::from("ext:meta"), String::from(r#"{"b":1,"a":2}"#))));
        assert_eq!(extension_tags(&restored), expected);
    }

    #[test]
    fn test_round_trip_ids_are_sequential() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (_, restored) = round_trip(dir.path());

        let node_ids = restored.nodes().map(|n| n.osmid.0).collect::<Vec<_>>();
        let way_ids = restored.ways().map(|w| w.osmid.0).collect::<Vec<_>>();
        assert_eq!(node_ids, (1..=restored.n_nodes() as i64).collect::<Vec<_>>());
        assert_eq!(way_ids, (1..=restored.n_ways() as i64).collect::<Vec<_>>());
        assert!(restored.dangling_references().is_empty());
        assert!(restored
            .ways()
            .flat_map(|w| w.nodes.iter())
            .all(|n| n.0 >= 1 && n.0 <= restored.n_nodes() as i64));
        assert!(restored.nodes().all(|n| n.version == Some(1)));
        // kerb split the sidewalk into two edges, plus the crossing
        assert_eq!(restored.n_ways(), 3);
    }
}
