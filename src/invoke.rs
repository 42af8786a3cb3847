use crate::error::WorkerError;
use crate::model::{EditModel, EditParams, EditRequest};
use image::RgbImage;

/// Placeholder negative prompt; the pipeline requires the field to be set.
const NEGATIVE_PROMPT: &str = " ";

/// Assembles the pipeline's argument set and invokes it exactly once,
/// returning the single edited image.
///
/// The source image is consumed: it is moved into the request's
/// single-element image sequence and dropped with it after the call.
pub fn run_inference<M: EditModel>(
    model: &M,
    image: RgbImage,
    prompt: &str,
    params: EditParams,
) -> Result<RgbImage, WorkerError> {
    let request = EditRequest {
        images: vec![image],
        prompt: prompt.to_string(),
        negative_prompt: NEGATIVE_PROMPT.to_string(),
        params,
        num_images_per_prompt: 1,
    };

    log::info!("Running Qwen-Image-Edit-2511 inference...");
    let output = model
        .edit(request)
        .map_err(|e| WorkerError::Inference {
            source: Box::new(e),
        })?;
    log::debug!("Inference completed");

    output
        .images
        .into_iter()
        .next()
        .ok_or_else(|| WorkerError::Inference {
            source: "pipeline returned an empty image sequence".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditOutput;
    use std::sync::Mutex;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct StubError(String);

    /// Records the request it saw and replays a canned output.
    struct RecordingModel {
        seen: Mutex<Option<(usize, String, String, EditParams, u32)>>,
        output: Vec<RgbImage>,
    }

    impl EditModel for RecordingModel {
        type Error = StubError;

        fn edit(&self, request: EditRequest) -> Result<EditOutput, Self::Error> {
            *self.seen.lock().unwrap() = Some((
                request.images.len(),
                request.prompt,
                request.negative_prompt,
                request.params,
                request.num_images_per_prompt,
            ));
            Ok(EditOutput {
                images: self.output.clone(),
            })
        }
    }

    #[test]
    fn builds_single_image_request_with_fixed_placeholders() {
        let model = RecordingModel {
            seen: Mutex::new(None),
            output: vec![RgbImage::new(4, 4)],
        };
        let params = EditParams {
            seed: 7,
            ..EditParams::default()
        };

        let out = run_inference(&model, RgbImage::new(2, 2), "make it rain", params).unwrap();
        assert_eq!(out.dimensions(), (4, 4));

        let (len, prompt, negative, seen_params, per_prompt) =
            model.seen.lock().unwrap().take().unwrap();
        assert_eq!(len, 1);
        assert_eq!(prompt, "make it rain");
        assert_eq!(negative, " ");
        assert_eq!(seen_params, params);
        assert_eq!(per_prompt, 1);
    }

    #[test]
    fn empty_output_sequence_is_an_inference_error() {
        let model = RecordingModel {
            seen: Mutex::new(None),
            output: vec![],
        };

        let err =
            run_inference(&model, RgbImage::new(2, 2), "p", EditParams::default()).unwrap_err();
        assert!(matches!(err, WorkerError::Inference { .. }));
    }
}
